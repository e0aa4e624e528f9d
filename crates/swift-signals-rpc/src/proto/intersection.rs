//! `swiftsignals.intersection`: intersection records and their parameter sets.

use super::common::{IntersectionStatus, OptimisationParameters, TrafficDensity};

/// Fully-qualified method paths of `swiftsignals.intersection.IntersectionService`.
pub mod methods {
    pub const CREATE_INTERSECTION: &str =
        "/swiftsignals.intersection.IntersectionService/CreateIntersection";
    pub const GET_INTERSECTION: &str =
        "/swiftsignals.intersection.IntersectionService/GetIntersection";
    pub const GET_ALL_INTERSECTIONS: &str =
        "/swiftsignals.intersection.IntersectionService/GetAllIntersections";
    pub const UPDATE_INTERSECTION: &str =
        "/swiftsignals.intersection.IntersectionService/UpdateIntersection";
    pub const DELETE_INTERSECTION: &str =
        "/swiftsignals.intersection.IntersectionService/DeleteIntersection";
    pub const PUT_OPTIMISATION: &str =
        "/swiftsignals.intersection.IntersectionService/PutOptimisation";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IntersectionDetails {
    #[prost(string, tag = "1")]
    pub address: String,
    #[prost(string, tag = "2")]
    pub city: String,
    #[prost(string, tag = "3")]
    pub province: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateIntersectionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub details: ::core::option::Option<IntersectionDetails>,
    #[prost(enumeration = "TrafficDensity", tag = "3")]
    pub traffic_density: i32,
    #[prost(message, optional, tag = "4")]
    pub default_parameters: ::core::option::Option<OptimisationParameters>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IntersectionIdRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAllIntersectionsRequest {
    #[prost(int32, tag = "1")]
    pub page: i32,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, tag = "3")]
    pub filter: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateIntersectionRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, optional, tag = "3")]
    pub details: ::core::option::Option<IntersectionDetails>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutOptimisationRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub parameters: ::core::option::Option<OptimisationParameters>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutOptimisationResponse {
    #[prost(bool, tag = "1")]
    pub improved: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IntersectionResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, optional, tag = "3")]
    pub details: ::core::option::Option<IntersectionDetails>,
    #[prost(message, optional, tag = "4")]
    pub created_at: ::core::option::Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub last_run_at: ::core::option::Option<::prost_types::Timestamp>,
    #[prost(enumeration = "IntersectionStatus", tag = "6")]
    pub status: i32,
    #[prost(int32, tag = "7")]
    pub run_count: i32,
    #[prost(enumeration = "TrafficDensity", tag = "8")]
    pub traffic_density: i32,
    #[prost(message, optional, tag = "9")]
    pub default_parameters: ::core::option::Option<OptimisationParameters>,
    #[prost(message, optional, tag = "10")]
    pub best_parameters: ::core::option::Option<OptimisationParameters>,
    #[prost(message, optional, tag = "11")]
    pub current_parameters: ::core::option::Option<OptimisationParameters>,
}
