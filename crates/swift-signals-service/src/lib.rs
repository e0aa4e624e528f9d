//! Service layer of the Swift Signals gateway.
//!
//! This is the only layer that calls more than one backend for a request. It enforces
//! the cross-service invariants:
//!
//! - a user may only touch intersections listed on their own record
//! - admin operations require the `admin` role
//! - server streams are drained completely; a broken stream is `internal` and never
//!   yields a partial result
//! - optimisation results are written back to the intersection service
//!
//! Downstream errors arrive already classified and are passed up unchanged.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    swift-signals-gateway                     │
//! │                         (handlers)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   swift-signals-service                      │
//! │  ┌──────┐ ┌─────────┐ ┌───────┐ ┌──────────────┐ ┌────────┐ │
//! │  │ Auth │ │ Profile │ │ Admin │ │ Intersection │ │  Sim   │ │
//! │  └──────┘ └─────────┘ └───────┘ └──────────────┘ └────────┘ │
//! │                 access: drain + membership check             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                    swift-signals-rpc clients
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use swift_signals_core::RequestScope;
//! use swift_signals_rpc::{GrpcUserClient, RpcChannel};
//! use swift_signals_service::{ProfileService, RpcProfileService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = RpcChannel::connect("localhost:50051", Duration::from_secs(5)).await?;
//! let profiles = RpcProfileService::new(Arc::new(GrpcUserClient::new(channel)));
//!
//! let user = profiles.get_profile(&RequestScope::new("req-1"), "user-1").await?;
//! println!("{}", user.username);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod access;
pub mod admin;
pub mod auth;
pub mod intersection;
pub mod profile;
pub mod simulation;

pub use admin::{AdminService, RpcAdminService};
pub use auth::{AuthService, RpcAuthService};
pub use intersection::{
    CreateIntersection, IntersectionService, IntersectionUpdate, RpcIntersectionService,
};
pub use profile::{ProfileService, RpcProfileService, UserUpdate};
pub use simulation::{RpcSimulationService, SimulationService};
