//! Client for the optimisation service.

use std::time::Duration;

use async_trait::async_trait;
use swift_signals_core::{OptimisationParameters, RequestScope, Result};

use crate::call::{self, OPTIMISATION_TIMEOUT};
use crate::channel::{RpcChannel, RpcTransport};
use crate::convert;
use crate::proto::common;
use crate::proto::optimisation::methods;

/// The long-running optimiser.
#[async_trait]
pub trait OptimisationClient: Send + Sync {
    /// Search for better parameters starting from `parameters`.
    ///
    /// # Errors
    ///
    /// Any backend failure, or `internal` if the optimisation deadline elapses.
    async fn run_optimisation(
        &self,
        scope: &RequestScope,
        parameters: &OptimisationParameters,
    ) -> Result<common::OptimisationParameters>;
}

/// gRPC implementation of [`OptimisationClient`].
#[derive(Debug, Clone)]
pub struct GrpcOptimisationClient<T: RpcTransport = RpcChannel> {
    transport: T,
    timeout: Duration,
}

impl<T: RpcTransport> GrpcOptimisationClient<T> {
    /// Create a client with the default optimisation deadline.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: OPTIMISATION_TIMEOUT,
        }
    }

    /// Override the optimisation deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl<T: RpcTransport> OptimisationClient for GrpcOptimisationClient<T> {
    async fn run_optimisation(
        &self,
        scope: &RequestScope,
        parameters: &OptimisationParameters,
    ) -> Result<common::OptimisationParameters> {
        let message = convert::optimisation_parameters_to_wire(parameters);
        call::invoke(
            &self.transport,
            scope,
            methods::RUN_OPTIMISATION,
            message,
            self.timeout,
        )
        .await
    }
}
