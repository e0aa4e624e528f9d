//! Simulation runs composed from the intersection and simulation services.

use std::sync::Arc;

use async_trait::async_trait;
use swift_signals_core::{ParameterRole, RequestScope, Result, ServiceError, SimulationResponse};
use swift_signals_rpc::convert::{
    intersection_from_wire, simulation_output_from_wire, simulation_results_from_wire,
};
use swift_signals_rpc::{IntersectionClient, SimulationClient, UserClient};

use crate::access::ensure_intersection_access;

/// Simulations of the caller's intersections.
#[async_trait]
pub trait SimulationService: Send + Sync {
    /// Simulate the intersection with its `role` parameters.
    ///
    /// # Errors
    ///
    /// `forbidden` if the intersection is not on the caller's record; `not_found` if
    /// `role` is [`ParameterRole::Best`] and no optimisation has succeeded yet.
    async fn simulate(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_id: &str,
        role: ParameterRole,
    ) -> Result<SimulationResponse>;
}

/// [`SimulationService`] backed by the user, intersection and simulation services.
pub struct RpcSimulationService {
    users: Arc<dyn UserClient>,
    intersections: Arc<dyn IntersectionClient>,
    simulator: Arc<dyn SimulationClient>,
}

impl RpcSimulationService {
    /// Create the service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserClient>,
        intersections: Arc<dyn IntersectionClient>,
        simulator: Arc<dyn SimulationClient>,
    ) -> Self {
        Self {
            users,
            intersections,
            simulator,
        }
    }
}

#[async_trait]
impl SimulationService for RpcSimulationService {
    async fn simulate(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_id: &str,
        role: ParameterRole,
    ) -> Result<SimulationResponse> {
        ensure_intersection_access(self.users.as_ref(), scope, user_id, intersection_id).await?;

        tracing::debug!(
            intersection_id,
            "calling intersection service to get simulation parameters"
        );
        let intersection = self
            .intersections
            .get_intersection(scope, intersection_id)
            .await?;
        let intersection = intersection_from_wire(intersection);

        let parameters = intersection
            .parameters(role)
            .ok_or_else(|| {
                ServiceError::not_found("no optimised parameters found for this intersection")
                    .with_context("intersection_id", intersection_id)
            })?
            .simulation_parameters
            .clone();

        tracing::debug!(intersection_id, %role, "calling simulation service to get results");
        let results = self
            .simulator
            .get_simulation_results(scope, &intersection.id, &parameters)
            .await?;

        tracing::debug!(intersection_id, %role, "calling simulation service to get output");
        let output = self
            .simulator
            .get_simulation_output(scope, &intersection.id, &parameters)
            .await?;

        Ok(SimulationResponse {
            results: simulation_results_from_wire(results),
            output: simulation_output_from_wire(output),
        })
    }
}

#[cfg(test)]
mod tests {
    use swift_signals_core::{ErrorKind, OptimisationParameters};
    use swift_signals_rpc::proto::simulation::methods;
    use swift_signals_rpc::testing::{
        sample_intersection, FakeIntersectionClient, FakeSimulationClient, FakeUserClient,
    };
    use swift_signals_rpc::IntersectionClient as _;

    use super::*;

    struct Fixture {
        intersections: Arc<FakeIntersectionClient>,
        simulator: Arc<FakeSimulationClient>,
        service: RpcSimulationService,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(FakeUserClient::new());
        let intersections = Arc::new(FakeIntersectionClient::new());
        let simulator = Arc::new(FakeSimulationClient::new());
        users.insert_member("u-1", &["int-1"]);
        intersections.insert(sample_intersection("int-1", "Main"));
        intersections.insert(sample_intersection("int-2", "Other"));
        let service = RpcSimulationService::new(users, intersections.clone(), simulator.clone());
        Fixture {
            intersections,
            simulator,
            service,
        }
    }

    #[tokio::test]
    async fn simulates_default_parameters() {
        let f = fixture();
        let response = f
            .service
            .simulate(&RequestScope::new("req"), "u-1", "int-1", ParameterRole::Default)
            .await
            .unwrap();

        assert_eq!(response.results.total_vehicles, 120);
        assert_eq!(response.output.intersection.nodes[0].node_type, "traffic_light");

        let received = f.simulator.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].0, "int-1");
        assert_eq!(received[0].1.green, 10);
    }

    #[tokio::test]
    async fn best_without_optimisation_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .simulate(&RequestScope::new("req"), "u-1", "int-1", ParameterRole::Best)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "no optimised parameters found for this intersection");
        assert!(f.simulator.received().is_empty());
    }

    #[tokio::test]
    async fn simulates_best_parameters() {
        let f = fixture();
        let scope = RequestScope::new("req");
        let mut best = OptimisationParameters::default();
        best.simulation_parameters.green = 25;
        f.intersections
            .put_optimisation(&scope, "int-1", &best)
            .await
            .unwrap();

        f.service
            .simulate(&scope, "u-1", "int-1", ParameterRole::Best)
            .await
            .unwrap();
        assert_eq!(f.simulator.received()[0].1.green, 25);
    }

    #[tokio::test]
    async fn foreign_intersection_is_forbidden() {
        let f = fixture();
        let err = f
            .service
            .simulate(&RequestScope::new("req"), "u-1", "int-2", ParameterRole::Default)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn simulator_failure_propagates_unchanged() {
        let f = fixture();
        f.simulator
            .fail(methods::GET_SIMULATION_OUTPUT, ErrorKind::Unavailable, "simulator busy");

        let err = f
            .service
            .simulate(&RequestScope::new("req"), "u-1", "int-1", ParameterRole::Default)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert_eq!(err.message(), "simulator busy");
    }
}
