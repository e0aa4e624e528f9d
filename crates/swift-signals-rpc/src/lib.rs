//! gRPC clients for the Swift Signals backend services.
//!
//! One client per backend, each behind a trait so the service layer can be tested
//! against in-memory fakes. Every client method builds the wire request from domain
//! inputs, attaches a deadline and the request ID, invokes the backend, and maps any
//! failure into the [`swift_signals_core::ServiceError`] taxonomy before returning.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     swift-signals-service                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ UserClient, IntersectionClient,
//!                              │ OptimisationClient, SimulationClient
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      swift-signals-rpc                       │
//! │  ┌────────────┐ ┌──────────────┐ ┌────────────────────────┐ │
//! │  │  convert   │ │ call         │ │ status                 │ │
//! │  │ JSON↔wire  │ │ deadlines,   │ │ gRPC code → ErrorKind  │ │
//! │  │            │ │ x-request-id │ │                        │ │
//! │  └────────────┘ └──────┬───────┘ └────────────────────────┘ │
//! │                        ▼                                    │
//! │                 RpcTransport (RpcChannel)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTP/2
//!          ┌───────────────┬───┴───────────┬───────────────┐
//!          ▼               ▼               ▼               ▼
//!     ┌─────────┐   ┌──────────────┐ ┌────────────┐ ┌────────────┐
//!     │  User   │   │ Intersection │ │Optimisation│ │ Simulation │
//!     └─────────┘   └──────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! # Deadlines
//!
//! | Call | Deadline |
//! |------|----------|
//! | unary | [`UNARY_TIMEOUT`] (5 s) |
//! | `RunOptimisation` | [`OPTIMISATION_TIMEOUT`] (5 h) |
//! | server streams | none added |
//!
//! A deadline on the [`swift_signals_core::RequestScope`] always wins if it is stricter.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use swift_signals_core::RequestScope;
//! use swift_signals_rpc::{GrpcUserClient, RpcChannel, UserClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = RpcChannel::connect("localhost:50051", Duration::from_secs(5)).await?;
//! let users = GrpcUserClient::new(channel);
//!
//! let scope = RequestScope::new("req-1");
//! let user = users.get_user_by_id(&scope, "user-1").await?;
//! println!("{}", user.email);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod call;
pub mod channel;
pub mod convert;
pub mod intersection;
pub mod optimisation;
pub mod proto;
pub mod simulation;
pub mod status;
pub mod user;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use call::{ServiceStream, OPTIMISATION_TIMEOUT, REQUEST_ID_METADATA, UNARY_TIMEOUT};
pub use channel::{ConnectError, RpcChannel, RpcStream, RpcTransport};
pub use intersection::{GrpcIntersectionClient, IntersectionClient, NewIntersection};
pub use optimisation::{GrpcOptimisationClient, OptimisationClient};
pub use simulation::{GrpcSimulationClient, SimulationClient};
pub use user::{GrpcUserClient, UserClient};
