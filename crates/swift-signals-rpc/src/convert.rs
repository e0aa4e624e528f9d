//! Pure conversions between the wire model and the JSON model.
//!
//! String-to-enum parsing is case-insensitive and accepts common spelling variants
//! (`t-junction`, `t_junction`, `tjunction`, `optimized`, the backend's own
//! `INTERSECTION_TYPE_*` names). Unknown strings and unknown wire values degrade to a
//! documented default with a warning rather than failing: the backend has the final
//! say on what it accepts.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use swift_signals_core::{
    Details, Intersection, OptimisationParameters, SimulationConnection, SimulationEdge,
    SimulationIntersection, SimulationNode, SimulationOutput, SimulationParameters,
    SimulationPhase, SimulationResults, SimulationTrafficLight, SimulationVehicle, User,
    VehiclePosition,
};

use crate::proto::common::{
    self as pb_common, IntersectionStatus, IntersectionType, OptimisationType, TrafficDensity,
};
use crate::proto::intersection as pb_intersection;
use crate::proto::simulation::{self as pb_simulation, NodeType};
use crate::proto::user as pb_user;

// =============================================================================
// Enums
// =============================================================================

fn normalise<'a>(value: &str, prefix: &str, buf: &'a mut String) -> &'a str {
    *buf = value.trim().to_ascii_lowercase();
    if let Some(rest) = buf.strip_prefix(prefix) {
        *buf = rest.to_string();
    }
    buf.as_str()
}

/// Parse an optimisation type. Unknown values become `gridsearch`.
#[must_use]
pub fn optimisation_type_from_str(value: &str) -> OptimisationType {
    let mut buf = String::new();
    match normalise(value, "optimisation_type_", &mut buf) {
        "gridsearch" | "grid_search" | "grid-search" => OptimisationType::Gridsearch,
        "genetic_evaluation" | "genetic-evaluation" | "genetic" => {
            OptimisationType::GeneticEvaluation
        }
        "none" | "" => OptimisationType::None,
        _ => {
            tracing::warn!(value, "unknown optimisation type, defaulting to gridsearch");
            OptimisationType::Gridsearch
        }
    }
}

/// Canonical name of an optimisation type.
#[must_use]
pub const fn optimisation_type_to_str(value: OptimisationType) -> &'static str {
    match value {
        OptimisationType::None => "none",
        OptimisationType::Gridsearch => "gridsearch",
        OptimisationType::GeneticEvaluation => "genetic_evaluation",
    }
}

/// Parse an intersection type. Hyphens and underscores are ignored; unknown values
/// become `unspecified`.
#[must_use]
pub fn intersection_type_from_str(value: &str) -> IntersectionType {
    let mut buf = String::new();
    let squashed: String = normalise(value, "intersection_type_", &mut buf)
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    match squashed.as_str() {
        "trafficlight" => IntersectionType::Trafficlight,
        "tjunction" => IntersectionType::Tjunction,
        "roundabout" => IntersectionType::Roundabout,
        "stopsign" => IntersectionType::StopSign,
        "unspecified" | "" => IntersectionType::Unspecified,
        _ => {
            tracing::warn!(value, "unknown intersection type, defaulting to unspecified");
            IntersectionType::Unspecified
        }
    }
}

/// Canonical name of an intersection type.
#[must_use]
pub const fn intersection_type_to_str(value: IntersectionType) -> &'static str {
    match value {
        IntersectionType::Unspecified => "unspecified",
        IntersectionType::Trafficlight => "traffic_light",
        IntersectionType::Tjunction => "t_junction",
        IntersectionType::Roundabout => "roundabout",
        IntersectionType::StopSign => "stop_sign",
    }
}

/// Parse a traffic density. Unknown values become `medium`.
#[must_use]
pub fn traffic_density_from_str(value: &str) -> TrafficDensity {
    let mut buf = String::new();
    match normalise(value, "traffic_density_", &mut buf) {
        "low" => TrafficDensity::Low,
        "medium" => TrafficDensity::Medium,
        "high" => TrafficDensity::High,
        _ => {
            tracing::warn!(value, "unknown traffic density, defaulting to medium");
            TrafficDensity::Medium
        }
    }
}

/// Canonical name of a traffic density.
#[must_use]
pub const fn traffic_density_to_str(value: TrafficDensity) -> &'static str {
    match value {
        TrafficDensity::Low => "low",
        TrafficDensity::Medium => "medium",
        TrafficDensity::High => "high",
    }
}

/// Parse an intersection status. Unknown values become `unoptimised`.
#[must_use]
pub fn intersection_status_from_str(value: &str) -> IntersectionStatus {
    let mut buf = String::new();
    match normalise(value, "intersection_status_", &mut buf) {
        "unoptimised" | "unoptimized" => IntersectionStatus::Unoptimised,
        "optimising" | "optimizing" => IntersectionStatus::Optimising,
        "optimised" | "optimized" => IntersectionStatus::Optimised,
        "failed" => IntersectionStatus::Failed,
        _ => {
            tracing::warn!(value, "unknown intersection status, defaulting to unoptimised");
            IntersectionStatus::Unoptimised
        }
    }
}

/// Canonical name of an intersection status.
#[must_use]
pub const fn intersection_status_to_str(value: IntersectionStatus) -> &'static str {
    match value {
        IntersectionStatus::Unoptimised => "unoptimised",
        IntersectionStatus::Optimising => "optimising",
        IntersectionStatus::Optimised => "optimised",
        IntersectionStatus::Failed => "failed",
    }
}

/// Canonical name of a simulation node type.
#[must_use]
pub const fn node_type_to_str(value: NodeType) -> &'static str {
    match value {
        NodeType::Priority => "priority",
        NodeType::TrafficLight => "traffic_light",
    }
}

/// Decode a wire enum value, falling back to the enum's zero value.
fn enum_or_default<E>(value: i32, what: &'static str) -> E
where
    E: TryFrom<i32> + Default,
{
    E::try_from(value).unwrap_or_else(|_| {
        tracing::warn!(value, what, "unknown enum value on the wire, using default");
        E::default()
    })
}

// =============================================================================
// Timestamps
// =============================================================================

/// Convert a wire timestamp. Absent or out-of-range values become the Unix epoch.
#[must_use]
pub fn timestamp_to_datetime(value: Option<&Timestamp>) -> DateTime<Utc> {
    value
        .and_then(|ts| DateTime::from_timestamp(ts.seconds, u32::try_from(ts.nanos).unwrap_or(0)))
        .unwrap_or_default()
}

// =============================================================================
// Users
// =============================================================================

/// Convert a wire user.
#[must_use]
pub fn user_from_wire(user: pb_user::UserResponse) -> User {
    User {
        id: user.id,
        username: user.name,
        email: user.email,
        is_admin: user.is_admin,
        intersection_ids: user.intersection_ids,
    }
}

// =============================================================================
// Intersections
// =============================================================================

/// Convert domain details to the wire.
#[must_use]
pub fn details_to_wire(details: &Details) -> pb_intersection::IntersectionDetails {
    pb_intersection::IntersectionDetails {
        address: details.address.clone(),
        city: details.city.clone(),
        province: details.province.clone(),
    }
}

/// Convert wire details.
#[must_use]
pub fn details_from_wire(details: pb_intersection::IntersectionDetails) -> Details {
    Details {
        address: details.address,
        city: details.city,
        province: details.province,
    }
}

/// Convert domain simulation parameters to the wire.
#[must_use]
pub fn simulation_parameters_to_wire(
    params: &SimulationParameters,
) -> pb_common::SimulationParameters {
    pb_common::SimulationParameters {
        intersection_type: intersection_type_from_str(&params.intersection_type).into(),
        green: params.green,
        yellow: params.yellow,
        red: params.red,
        speed: params.speed,
        seed: params.seed,
    }
}

/// Convert wire simulation parameters.
#[must_use]
pub fn simulation_parameters_from_wire(
    params: pb_common::SimulationParameters,
) -> SimulationParameters {
    let intersection_type: IntersectionType =
        enum_or_default(params.intersection_type, "intersection_type");
    SimulationParameters {
        intersection_type: intersection_type_to_str(intersection_type).to_string(),
        green: params.green,
        yellow: params.yellow,
        red: params.red,
        speed: params.speed,
        seed: params.seed,
    }
}

/// Convert domain optimisation parameters to the wire.
#[must_use]
pub fn optimisation_parameters_to_wire(
    params: &OptimisationParameters,
) -> pb_common::OptimisationParameters {
    pb_common::OptimisationParameters {
        optimisation_type: optimisation_type_from_str(&params.optimisation_type).into(),
        parameters: Some(simulation_parameters_to_wire(&params.simulation_parameters)),
    }
}

/// Convert wire optimisation parameters.
#[must_use]
pub fn optimisation_parameters_from_wire(
    params: pb_common::OptimisationParameters,
) -> OptimisationParameters {
    let optimisation_type: OptimisationType =
        enum_or_default(params.optimisation_type, "optimisation_type");
    OptimisationParameters {
        optimisation_type: optimisation_type_to_str(optimisation_type).to_string(),
        simulation_parameters: params
            .parameters
            .map(simulation_parameters_from_wire)
            .unwrap_or_default(),
    }
}

/// Convert a wire intersection.
#[must_use]
pub fn intersection_from_wire(intersection: pb_intersection::IntersectionResponse) -> Intersection {
    let status: IntersectionStatus = enum_or_default(intersection.status, "status");
    let traffic_density: TrafficDensity =
        enum_or_default(intersection.traffic_density, "traffic_density");

    Intersection {
        created_at: timestamp_to_datetime(intersection.created_at.as_ref()),
        last_run_at: timestamp_to_datetime(intersection.last_run_at.as_ref()),
        id: intersection.id,
        name: intersection.name,
        details: intersection
            .details
            .map(details_from_wire)
            .unwrap_or_default(),
        status: intersection_status_to_str(status).to_string(),
        run_count: intersection.run_count,
        traffic_density: traffic_density_to_str(traffic_density).to_string(),
        default_parameters: intersection
            .default_parameters
            .map(optimisation_parameters_from_wire)
            .unwrap_or_default(),
        best_parameters: intersection
            .best_parameters
            .map(optimisation_parameters_from_wire),
        current_parameters: intersection
            .current_parameters
            .map(optimisation_parameters_from_wire)
            .unwrap_or_default(),
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Convert wire simulation metrics.
#[must_use]
pub fn simulation_results_from_wire(
    results: pb_simulation::SimulationResultsResponse,
) -> SimulationResults {
    SimulationResults {
        total_vehicles: results.total_vehicles,
        average_travel_time: results.average_travel_time,
        total_travel_time: results.total_travel_time,
        average_speed: results.average_speed,
        average_waiting_time: results.average_waiting_time,
        total_waiting_time: results.total_waiting_time,
        generated_vehicles: results.generated_vehicles,
        emergency_brakes: results.emergency_brakes,
        emergency_stops: results.emergency_stops,
        near_collisions: results.near_collisions,
    }
}

/// Convert wire simulation output.
#[must_use]
pub fn simulation_output_from_wire(output: pb_simulation::SimulationOutputResponse) -> SimulationOutput {
    let network = output.intersection.unwrap_or_default();

    SimulationOutput {
        intersection: SimulationIntersection {
            nodes: network
                .nodes
                .into_iter()
                .map(|node| {
                    let node_type: NodeType = enum_or_default(node.node_type, "node_type");
                    SimulationNode {
                        id: node.id,
                        x: node.x,
                        y: node.y,
                        node_type: node_type_to_str(node_type).to_string(),
                    }
                })
                .collect(),
            edges: network
                .edges
                .into_iter()
                .map(|edge| SimulationEdge {
                    id: edge.id,
                    from: edge.from,
                    to: edge.to,
                    speed: edge.speed,
                    lanes: edge.lanes,
                })
                .collect(),
            connections: network
                .connections
                .into_iter()
                .map(|conn| SimulationConnection {
                    from: conn.from,
                    to: conn.to,
                    from_lane: conn.from_lane,
                    to_lane: conn.to_lane,
                    tl: conn.tl,
                })
                .collect(),
            traffic_lights: network
                .traffic_lights
                .into_iter()
                .map(|light| SimulationTrafficLight {
                    id: light.id,
                    light_type: light.light_type,
                    phases: light
                        .phases
                        .into_iter()
                        .map(|phase| SimulationPhase {
                            duration: phase.duration,
                            state: phase.state,
                        })
                        .collect(),
                })
                .collect(),
        },
        vehicles: output
            .vehicles
            .into_iter()
            .map(|vehicle| SimulationVehicle {
                id: vehicle.id,
                positions: vehicle
                    .positions
                    .into_iter()
                    .map(|pos| VehiclePosition {
                        time: pos.time,
                        x: pos.x,
                        y: pos.y,
                        speed: pos.speed,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimisation_type_round_trip() {
        for value in [
            OptimisationType::None,
            OptimisationType::Gridsearch,
            OptimisationType::GeneticEvaluation,
        ] {
            assert_eq!(
                optimisation_type_from_str(optimisation_type_to_str(value)),
                value
            );
        }
    }

    #[test]
    fn intersection_type_round_trip() {
        for value in [
            IntersectionType::Unspecified,
            IntersectionType::Trafficlight,
            IntersectionType::Tjunction,
            IntersectionType::Roundabout,
            IntersectionType::StopSign,
        ] {
            assert_eq!(
                intersection_type_from_str(intersection_type_to_str(value)),
                value
            );
        }
    }

    #[test]
    fn traffic_density_and_status_round_trip() {
        for value in [TrafficDensity::Low, TrafficDensity::Medium, TrafficDensity::High] {
            assert_eq!(traffic_density_from_str(traffic_density_to_str(value)), value);
        }
        for value in [
            IntersectionStatus::Unoptimised,
            IntersectionStatus::Optimising,
            IntersectionStatus::Optimised,
            IntersectionStatus::Failed,
        ] {
            assert_eq!(
                intersection_status_from_str(intersection_status_to_str(value)),
                value
            );
        }
    }

    #[test]
    fn spelling_variants() {
        for variant in ["t-junction", "t_junction", "tjunction", "T-Junction", "INTERSECTION_TYPE_TJUNCTION"] {
            assert_eq!(intersection_type_from_str(variant), IntersectionType::Tjunction);
        }
        for variant in ["traffic-light", "traffic_light", "TrafficLight"] {
            assert_eq!(intersection_type_from_str(variant), IntersectionType::Trafficlight);
        }
        for variant in ["stop-sign", "stop_sign", "STOPSIGN"] {
            assert_eq!(intersection_type_from_str(variant), IntersectionType::StopSign);
        }
        for variant in ["grid_search", "GridSearch", "OPTIMISATION_TYPE_GRIDSEARCH"] {
            assert_eq!(optimisation_type_from_str(variant), OptimisationType::Gridsearch);
        }
        assert_eq!(optimisation_type_from_str("genetic"), OptimisationType::GeneticEvaluation);
        assert_eq!(intersection_status_from_str("Optimized"), IntersectionStatus::Optimised);
        assert_eq!(traffic_density_from_str("HIGH"), TrafficDensity::High);
    }

    #[test]
    fn unknown_strings_degrade() {
        assert_eq!(optimisation_type_from_str("simulated-annealing"), OptimisationType::Gridsearch);
        assert_eq!(intersection_type_from_str("cloverleaf"), IntersectionType::Unspecified);
        assert_eq!(traffic_density_from_str("gridlock"), TrafficDensity::Medium);
        assert_eq!(intersection_status_from_str("paused"), IntersectionStatus::Unoptimised);
        assert_eq!(optimisation_type_from_str(""), OptimisationType::None);
    }

    #[test]
    fn unknown_wire_values_degrade() {
        let params = simulation_parameters_from_wire(pb_common::SimulationParameters {
            intersection_type: 99,
            ..Default::default()
        });
        assert_eq!(params.intersection_type, "unspecified");
    }

    #[test]
    fn parameters_round_trip() {
        let params = OptimisationParameters {
            optimisation_type: "genetic_evaluation".into(),
            simulation_parameters: SimulationParameters {
                intersection_type: "roundabout".into(),
                green: 10,
                yellow: 2,
                red: 6,
                speed: 60,
                seed: 42,
            },
        };
        let back = optimisation_parameters_from_wire(optimisation_parameters_to_wire(&params));
        assert_eq!(back, params);
    }

    #[test]
    fn intersection_conversion() {
        let wire = pb_intersection::IntersectionResponse {
            id: "int-1".into(),
            name: "Main & 1st".into(),
            details: Some(pb_intersection::IntersectionDetails {
                address: "1 Main St".into(),
                city: "Pretoria".into(),
                province: "Gauteng".into(),
            }),
            created_at: Some(Timestamp {
                seconds: 1_750_777_445,
                nanos: 0,
            }),
            last_run_at: None,
            status: IntersectionStatus::Optimised.into(),
            run_count: 3,
            traffic_density: TrafficDensity::High.into(),
            default_parameters: Some(pb_common::OptimisationParameters::default()),
            best_parameters: None,
            current_parameters: None,
        };

        let intersection = intersection_from_wire(wire);
        assert_eq!(intersection.status, "optimised");
        assert_eq!(intersection.traffic_density, "high");
        assert_eq!(intersection.details.city, "Pretoria");
        assert_eq!(intersection.created_at.to_rfc3339(), "2025-06-24T15:04:05+00:00");
        assert_eq!(intersection.last_run_at, DateTime::<Utc>::default());
        assert!(intersection.best_parameters.is_none());
        assert_eq!(intersection.default_parameters.optimisation_type, "none");
    }

    #[test]
    fn user_conversion() {
        let user = user_from_wire(pb_user::UserResponse {
            id: "u-1".into(),
            name: "alice".into(),
            email: "a@x.com".into(),
            is_admin: true,
            intersection_ids: vec!["int-7".into()],
            created_at: None,
            updated_at: None,
        });
        assert_eq!(user.username, "alice");
        assert!(user.is_admin);
        assert_eq!(user.intersection_ids, vec!["int-7".to_string()]);
    }

    #[test]
    fn simulation_output_conversion() {
        let output = simulation_output_from_wire(pb_simulation::SimulationOutputResponse {
            intersection: Some(pb_simulation::Intersection {
                nodes: vec![pb_simulation::Node {
                    id: "n1".into(),
                    x: 1.0,
                    y: 2.0,
                    node_type: NodeType::TrafficLight.into(),
                }],
                traffic_lights: vec![pb_simulation::TrafficLight {
                    id: "tl1".into(),
                    light_type: "static".into(),
                    phases: vec![pb_simulation::Phase {
                        duration: 30,
                        state: "GGrr".into(),
                    }],
                }],
                ..Default::default()
            }),
            vehicles: vec![pb_simulation::Vehicle {
                id: "v1".into(),
                positions: vec![pb_simulation::Position {
                    time: 0,
                    x: 0.5,
                    y: 0.5,
                    speed: 13.9,
                }],
            }],
        });

        assert_eq!(output.intersection.nodes[0].node_type, "traffic_light");
        assert_eq!(output.intersection.traffic_lights[0].phases[0].duration, 30);
        assert_eq!(output.vehicles[0].positions[0].speed, 13.9);
    }
}
