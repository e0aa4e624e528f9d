//! Client for the simulation service.

use std::time::Duration;

use async_trait::async_trait;
use swift_signals_core::{RequestScope, Result, SimulationParameters};

use crate::call::{self, UNARY_TIMEOUT};
use crate::channel::{RpcChannel, RpcTransport};
use crate::convert;
use crate::proto::simulation::{
    methods, SimulationOutputResponse, SimulationRequest, SimulationResultsResponse,
};

/// Runs simulations for an intersection.
#[async_trait]
pub trait SimulationClient: Send + Sync {
    /// Scalar metrics of one run.
    async fn get_simulation_results(
        &self,
        scope: &RequestScope,
        intersection_id: &str,
        parameters: &SimulationParameters,
    ) -> Result<SimulationResultsResponse>;

    /// Replay data of one run.
    async fn get_simulation_output(
        &self,
        scope: &RequestScope,
        intersection_id: &str,
        parameters: &SimulationParameters,
    ) -> Result<SimulationOutputResponse>;
}

/// gRPC implementation of [`SimulationClient`].
#[derive(Debug, Clone)]
pub struct GrpcSimulationClient<T: RpcTransport = RpcChannel> {
    transport: T,
    timeout: Duration,
}

impl<T: RpcTransport> GrpcSimulationClient<T> {
    /// Create a client with the default unary deadline.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: UNARY_TIMEOUT,
        }
    }

    /// Override the unary deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn request(intersection_id: &str, parameters: &SimulationParameters) -> SimulationRequest {
        SimulationRequest {
            intersection_id: intersection_id.to_string(),
            simulation_parameters: Some(convert::simulation_parameters_to_wire(parameters)),
        }
    }
}

#[async_trait]
impl<T: RpcTransport> SimulationClient for GrpcSimulationClient<T> {
    async fn get_simulation_results(
        &self,
        scope: &RequestScope,
        intersection_id: &str,
        parameters: &SimulationParameters,
    ) -> Result<SimulationResultsResponse> {
        call::invoke(
            &self.transport,
            scope,
            methods::GET_SIMULATION_RESULTS,
            Self::request(intersection_id, parameters),
            self.timeout,
        )
        .await
    }

    async fn get_simulation_output(
        &self,
        scope: &RequestScope,
        intersection_id: &str,
        parameters: &SimulationParameters,
    ) -> Result<SimulationOutputResponse> {
        call::invoke(
            &self.transport,
            scope,
            methods::GET_SIMULATION_OUTPUT,
            Self::request(intersection_id, parameters),
            self.timeout,
        )
        .await
    }
}
