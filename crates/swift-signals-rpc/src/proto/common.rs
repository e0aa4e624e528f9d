//! `swiftsignals.common`: enums and messages shared by several services.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OptimisationType {
    None = 0,
    Gridsearch = 1,
    GeneticEvaluation = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IntersectionType {
    Unspecified = 0,
    Trafficlight = 1,
    Tjunction = 2,
    Roundabout = 3,
    StopSign = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TrafficDensity {
    Low = 0,
    Medium = 1,
    High = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IntersectionStatus {
    Unoptimised = 0,
    Optimising = 1,
    Optimised = 2,
    Failed = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SimulationParameters {
    #[prost(enumeration = "IntersectionType", tag = "1")]
    pub intersection_type: i32,
    #[prost(int32, tag = "2")]
    pub green: i32,
    #[prost(int32, tag = "3")]
    pub yellow: i32,
    #[prost(int32, tag = "4")]
    pub red: i32,
    #[prost(int32, tag = "5")]
    pub speed: i32,
    #[prost(int32, tag = "6")]
    pub seed: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OptimisationParameters {
    #[prost(enumeration = "OptimisationType", tag = "1")]
    pub optimisation_type: i32,
    #[prost(message, optional, tag = "2")]
    pub parameters: ::core::option::Option<SimulationParameters>,
}
