//! `swiftsignals.simulation`: simulation metrics and replay output.

use super::common::SimulationParameters;

/// Fully-qualified method paths of `swiftsignals.simulation.SimulationService`.
pub mod methods {
    pub const GET_SIMULATION_RESULTS: &str =
        "/swiftsignals.simulation.SimulationService/GetSimulationResults";
    pub const GET_SIMULATION_OUTPUT: &str =
        "/swiftsignals.simulation.SimulationService/GetSimulationOutput";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum NodeType {
    Priority = 0,
    TrafficLight = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SimulationRequest {
    #[prost(string, tag = "1")]
    pub intersection_id: String,
    #[prost(message, optional, tag = "2")]
    pub simulation_parameters: ::core::option::Option<SimulationParameters>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SimulationResultsResponse {
    #[prost(int32, tag = "1")]
    pub total_vehicles: i32,
    #[prost(double, tag = "2")]
    pub average_travel_time: f64,
    #[prost(double, tag = "3")]
    pub total_travel_time: f64,
    #[prost(double, tag = "4")]
    pub average_speed: f64,
    #[prost(double, tag = "5")]
    pub average_waiting_time: f64,
    #[prost(double, tag = "6")]
    pub total_waiting_time: f64,
    #[prost(int32, tag = "7")]
    pub generated_vehicles: i32,
    #[prost(int32, tag = "8")]
    pub emergency_brakes: i32,
    #[prost(int32, tag = "9")]
    pub emergency_stops: i32,
    #[prost(int32, tag = "10")]
    pub near_collisions: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Node {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(double, tag = "2")]
    pub x: f64,
    #[prost(double, tag = "3")]
    pub y: f64,
    #[prost(enumeration = "NodeType", tag = "4")]
    pub node_type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Edge {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub from: String,
    #[prost(string, tag = "3")]
    pub to: String,
    #[prost(double, tag = "4")]
    pub speed: f64,
    #[prost(int32, tag = "5")]
    pub lanes: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Connection {
    #[prost(string, tag = "1")]
    pub from: String,
    #[prost(string, tag = "2")]
    pub to: String,
    #[prost(int32, tag = "3")]
    pub from_lane: i32,
    #[prost(int32, tag = "4")]
    pub to_lane: i32,
    #[prost(int32, tag = "5")]
    pub tl: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Phase {
    #[prost(int32, tag = "1")]
    pub duration: i32,
    #[prost(string, tag = "2")]
    pub state: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TrafficLight {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub light_type: String,
    #[prost(message, repeated, tag = "3")]
    pub phases: Vec<Phase>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Intersection {
    #[prost(message, repeated, tag = "1")]
    pub nodes: Vec<Node>,
    #[prost(message, repeated, tag = "2")]
    pub edges: Vec<Edge>,
    #[prost(message, repeated, tag = "3")]
    pub connections: Vec<Connection>,
    #[prost(message, repeated, tag = "4")]
    pub traffic_lights: Vec<TrafficLight>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Position {
    #[prost(int32, tag = "1")]
    pub time: i32,
    #[prost(double, tag = "2")]
    pub x: f64,
    #[prost(double, tag = "3")]
    pub y: f64,
    #[prost(double, tag = "4")]
    pub speed: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Vehicle {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, repeated, tag = "2")]
    pub positions: Vec<Position>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SimulationOutputResponse {
    #[prost(message, optional, tag = "1")]
    pub intersection: ::core::option::Option<Intersection>,
    #[prost(message, repeated, tag = "2")]
    pub vehicles: Vec<Vehicle>,
}
