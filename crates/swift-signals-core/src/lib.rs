//! Core types and utilities for the Swift Signals gateway.
//!
//! This crate provides the foundational types shared by every layer of the gateway:
//!
//! - **Error taxonomy**: the closed set of failure kinds and the `ServiceError` value
//!   that carries one of them from the layer that detected it up to the response writer
//! - **Request scope**: the per-request context (request ID, tracing span, caller
//!   identity, deadline) that every layer receives first
//! - **Model**: the client-facing JSON entities
//!
//! # Example
//!
//! ```
//! use swift_signals_core::{ErrorKind, RequestScope, ServiceError};
//!
//! let mut scope = RequestScope::new("req-1");
//! scope.authenticate("user-42", Some("admin".to_string()));
//! assert!(scope.is_admin());
//!
//! let err = ServiceError::forbidden("intersection not in user's intersection list")
//!     .with_context("intersection_id", "int-7");
//! assert_eq!(err.kind(), ErrorKind::Forbidden);
//! assert_eq!(err.status_code(), 403);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod model;
pub mod scope;

pub use error::{ErrorKind, Result, ServiceError};
pub use model::{
    CreateIntersectionResponse, Details, Intersection, Intersections, LoginResponse,
    MessageResponse, OptimisationParameters, OptimisationResponse, ParameterRole,
    RegisterResponse, SimulationConnection, SimulationEdge, SimulationIntersection,
    SimulationNode, SimulationOutput, SimulationParameters, SimulationPhase, SimulationResponse,
    SimulationResults, SimulationTrafficLight, SimulationVehicle, User, VehiclePosition,
};
pub use scope::{RequestScope, ADMIN_ROLE};
