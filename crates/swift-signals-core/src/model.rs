//! Client-facing JSON entities.
//!
//! Field names are snake_case on the wire and timestamps are RFC 3339 in UTC. Enum-like
//! fields (`status`, `traffic_density`, `optimisation_type`, `intersection_type`) are
//! carried as their canonical lowercase strings; mapping to and from the backend
//! enumerations happens in the RPC layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Users
// =============================================================================

/// A platform user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Whether the user may call admin routes.
    pub is_admin: bool,
    /// The intersections this user may read or mutate.
    pub intersection_ids: Vec<String>,
}

/// Response to a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// ID of the new user.
    pub user_id: String,
}

/// Response to a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// A plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Intersections
// =============================================================================

/// Where an intersection is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// Province.
    #[serde(default)]
    pub province: String,
}

/// Inputs for a single simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// One of `unspecified`, `traffic_light`, `t_junction`, `roundabout`, `stop_sign`.
    pub intersection_type: String,
    /// Green phase length.
    pub green: i32,
    /// Yellow phase length.
    pub yellow: i32,
    /// Red phase length.
    pub red: i32,
    /// Speed limit.
    pub speed: i32,
    /// Random seed.
    #[serde(default)]
    pub seed: i32,
}

/// A simulation-parameter set together with the algorithm that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimisationParameters {
    /// One of `none`, `gridsearch`, `genetic_evaluation`.
    pub optimisation_type: String,
    /// The parameters themselves.
    pub simulation_parameters: SimulationParameters,
}

/// A traffic junction under optimisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    /// Intersection ID.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Location.
    pub details: Details,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent optimisation run.
    pub last_run_at: DateTime<Utc>,
    /// One of `unoptimised`, `optimising`, `optimised`, `failed`.
    pub status: String,
    /// Number of optimisation runs so far.
    pub run_count: i32,
    /// One of `low`, `medium`, `high`.
    pub traffic_density: String,
    /// The user-supplied baseline.
    pub default_parameters: OptimisationParameters,
    /// The best parameters found so far. Absent until an optimisation succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_parameters: Option<OptimisationParameters>,
    /// The parameters applied in the most recent run.
    pub current_parameters: OptimisationParameters,
}

impl Intersection {
    /// The parameters stored under `role`, if present.
    #[must_use]
    pub fn parameters(&self, role: ParameterRole) -> Option<&OptimisationParameters> {
        match role {
            ParameterRole::Default => Some(&self.default_parameters),
            ParameterRole::Best => self.best_parameters.as_ref(),
        }
    }
}

/// Listing of intersections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersections {
    /// The intersections.
    pub intersections: Vec<Intersection>,
}

/// Response to a successful intersection creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIntersectionResponse {
    /// ID of the new intersection.
    pub id: String,
}

/// Which of an intersection's parameter sets to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    /// The user-supplied baseline.
    Default,
    /// The best set found by optimisation.
    Best,
}

impl ParameterRole {
    /// Lowercase name, for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Best => "best",
        }
    }
}

impl fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Simulation & Optimisation
// =============================================================================

/// Scalar metrics of a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    /// Vehicles that completed their route.
    pub total_vehicles: i32,
    /// Mean travel time per vehicle.
    pub average_travel_time: f64,
    /// Sum of all travel times.
    pub total_travel_time: f64,
    /// Mean vehicle speed.
    pub average_speed: f64,
    /// Mean waiting time per vehicle.
    pub average_waiting_time: f64,
    /// Sum of all waiting times.
    pub total_waiting_time: f64,
    /// Vehicles injected into the network.
    pub generated_vehicles: i32,
    /// Emergency braking events.
    pub emergency_brakes: i32,
    /// Emergency stop events.
    pub emergency_stops: i32,
    /// Near-collision events.
    pub near_collisions: i32,
}

/// A junction node in the simulated network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationNode {
    /// Node ID.
    pub id: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// `priority` or `traffic_light`.
    #[serde(rename = "type")]
    pub node_type: String,
}

/// A road segment between two nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationEdge {
    /// Edge ID.
    pub id: String,
    /// Source node ID.
    pub from: String,
    /// Target node ID.
    pub to: String,
    /// Speed limit.
    pub speed: f64,
    /// Lane count.
    pub lanes: i32,
}

/// A lane-to-lane connection through a junction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConnection {
    /// Incoming edge ID.
    pub from: String,
    /// Outgoing edge ID.
    pub to: String,
    /// Incoming lane index.
    pub from_lane: i32,
    /// Outgoing lane index.
    pub to_lane: i32,
    /// Traffic-light link index.
    pub tl: i32,
}

/// One phase of a traffic-light programme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationPhase {
    /// Phase length.
    pub duration: i32,
    /// Signal state string.
    pub state: String,
}

/// A traffic light and its programme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTrafficLight {
    /// Traffic light ID.
    pub id: String,
    /// Programme type.
    #[serde(rename = "type")]
    pub light_type: String,
    /// Phases in order.
    pub phases: Vec<SimulationPhase>,
}

/// The simulated road network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationIntersection {
    /// Junction nodes.
    pub nodes: Vec<SimulationNode>,
    /// Road segments.
    pub edges: Vec<SimulationEdge>,
    /// Lane connections.
    pub connections: Vec<SimulationConnection>,
    /// Traffic lights.
    pub traffic_lights: Vec<SimulationTrafficLight>,
}

/// A vehicle's position at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    /// Simulation time step.
    pub time: i32,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Instantaneous speed.
    pub speed: f64,
}

/// A vehicle's trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationVehicle {
    /// Vehicle ID.
    pub id: String,
    /// Positions in time order.
    pub positions: Vec<VehiclePosition>,
}

/// Everything needed to replay a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// The network.
    pub intersection: SimulationIntersection,
    /// Vehicle trajectories.
    pub vehicles: Vec<SimulationVehicle>,
}

/// Metrics and replay data for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    /// Scalar metrics.
    pub results: SimulationResults,
    /// Replay data.
    pub output: SimulationOutput,
}

/// Outcome of an optimisation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimisationResponse {
    /// Whether the run found better parameters than the previous best.
    pub improved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_parameters_omitted_when_absent() {
        let intersection = Intersection {
            id: "int-1".into(),
            ..Intersection::default()
        };
        let json = serde_json::to_value(&intersection).unwrap();
        assert!(json.get("best_parameters").is_none());
        assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn parameters_by_role() {
        let mut intersection = Intersection::default();
        assert!(intersection.parameters(ParameterRole::Default).is_some());
        assert!(intersection.parameters(ParameterRole::Best).is_none());

        intersection.best_parameters = Some(OptimisationParameters {
            optimisation_type: "gridsearch".into(),
            simulation_parameters: SimulationParameters {
                green: 12,
                ..SimulationParameters::default()
            },
        });
        let best = intersection.parameters(ParameterRole::Best).unwrap();
        assert_eq!(best.simulation_parameters.green, 12);
    }

    #[test]
    fn simulation_fields_are_snake_case() {
        let output = SimulationOutput {
            intersection: SimulationIntersection {
                nodes: vec![SimulationNode {
                    id: "n1".into(),
                    node_type: "priority".into(),
                    ..SimulationNode::default()
                }],
                connections: vec![SimulationConnection {
                    from_lane: 1,
                    ..SimulationConnection::default()
                }],
                ..SimulationIntersection::default()
            },
            vehicles: vec![],
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["intersection"]["nodes"][0]["type"], "priority");
        assert_eq!(json["intersection"]["connections"][0]["from_lane"], 1);
        assert!(json["intersection"]["traffic_lights"].is_array());
    }

    #[test]
    fn details_fields_default() {
        let details: Details = serde_json::from_str(r#"{"city":"Pretoria"}"#).unwrap();
        assert_eq!(details.city, "Pretoria");
        assert!(details.address.is_empty());
    }
}
