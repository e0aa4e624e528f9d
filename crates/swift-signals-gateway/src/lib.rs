//! HTTP gateway for the Swift Signals traffic optimisation platform.
//!
//! This crate provides the public-facing JSON API. It handles:
//!
//! - JWT authentication and role checks
//! - REST endpoints for accounts, intersections, simulation and optimisation
//! - Request IDs, structured request logging and CORS
//! - Handling and body-read timeouts, body size limits and graceful shutdown
//!
//! All persistent state lives in the backend services; the gateway only validates,
//! translates and forwards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                             │
//! │                        (HTTP/JSON)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   swift-signals-gateway                      │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ body timeout → body limit → CORS → request log → auth │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Extractors │ │  Handlers   │ │  Error writer       │    │
//! │  │ + validation│ │             │ │  {code, message}    │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ swift-signals-service
//!                              ▼ swift-signals-rpc
//!          ┌───────────────┬───────────────┬───────────────┐
//!          ▼               ▼               ▼               ▼
//!     ┌─────────┐   ┌──────────────┐ ┌────────────┐ ┌────────────┐
//!     │  User   │   │ Intersection │ │Optimisation│ │ Simulation │
//!     └─────────┘   └──────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use swift_signals_auth::HmacJwtValidator;
//! use swift_signals_gateway::{create_router, Backends, GatewayConfig, GatewayState};
//! use swift_signals_rpc::{
//!     GrpcIntersectionClient, GrpcOptimisationClient, GrpcSimulationClient, GrpcUserClient,
//!     RpcChannel,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let connect = config.connect_timeout();
//!
//! let backends = Backends {
//!     users: Arc::new(GrpcUserClient::new(
//!         RpcChannel::connect(&config.user_service_addr, connect).await?,
//!     )),
//!     intersections: Arc::new(GrpcIntersectionClient::new(
//!         RpcChannel::connect(&config.intersection_service_addr, connect).await?,
//!     )),
//!     optimiser: Arc::new(GrpcOptimisationClient::new(
//!         RpcChannel::connect(&config.optimisation_service_addr, connect).await?,
//!     )),
//!     simulator: Arc::new(GrpcSimulationClient::new(
//!         RpcChannel::connect(&config.simulation_service_addr, connect).await?,
//!     )),
//! };
//! let validator = Arc::new(HmacJwtValidator::new(config.jwt_secret.as_bytes()));
//!
//! let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
//! let app = create_router(GatewayState::new(backends, validator, config));
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod shutdown;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use config::{ConfigError, GatewayConfig, LogFormat};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use shutdown::{serve_until_shutdown, shutdown_signal};
pub use state::{Backends, GatewayState};
