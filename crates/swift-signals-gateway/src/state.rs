//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers,
//! and the wiring from RPC clients to services.

use std::sync::Arc;

use swift_signals_auth::JwtValidator;
use swift_signals_rpc::{IntersectionClient, OptimisationClient, SimulationClient, UserClient};
use swift_signals_service::{
    AdminService, AuthService, IntersectionService, ProfileService, RpcAdminService,
    RpcAuthService, RpcIntersectionService, RpcProfileService, RpcSimulationService,
    SimulationService,
};

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// Holds one instance of every service plus the token validator. Built once at
/// startup and read-only afterwards.
pub struct GatewayState {
    /// Registration, login and password reset.
    pub auth: Arc<dyn AuthService>,
    /// The caller's own account.
    pub profiles: Arc<dyn ProfileService>,
    /// Admin user management.
    pub admin: Arc<dyn AdminService>,
    /// Intersection management and optimisation.
    pub intersections: Arc<dyn IntersectionService>,
    /// Simulation runs.
    pub simulations: Arc<dyn SimulationService>,
    /// The JWT validator for authentication.
    pub jwt_validator: Arc<dyn JwtValidator>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

/// The four backend clients.
#[derive(Clone)]
pub struct Backends {
    /// User service.
    pub users: Arc<dyn UserClient>,
    /// Intersection service.
    pub intersections: Arc<dyn IntersectionClient>,
    /// Optimisation service.
    pub optimiser: Arc<dyn OptimisationClient>,
    /// Simulation service.
    pub simulator: Arc<dyn SimulationClient>,
}

impl GatewayState {
    /// Build every service on top of `backends`.
    #[must_use]
    pub fn new(
        backends: Backends,
        jwt_validator: Arc<dyn JwtValidator>,
        config: GatewayConfig,
    ) -> Self {
        let Backends {
            users,
            intersections,
            optimiser,
            simulator,
        } = backends;

        Self {
            auth: Arc::new(RpcAuthService::new(Arc::clone(&users))),
            profiles: Arc::new(RpcProfileService::new(Arc::clone(&users))),
            admin: Arc::new(RpcAdminService::new(Arc::clone(&users))),
            intersections: Arc::new(RpcIntersectionService::new(
                Arc::clone(&users),
                Arc::clone(&intersections),
                optimiser,
            )),
            simulations: Arc::new(RpcSimulationService::new(users, intersections, simulator)),
            jwt_validator,
            config,
        }
    }
}
