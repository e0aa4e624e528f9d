//! Wire schema of the backend services.
//!
//! Messages are declared with prost derives so the crate builds without `protoc`.
//! Field tags and enum values must stay in step with the backends' `.proto` files.
//!
//! | Module | Package | Service |
//! |--------|---------|---------|
//! | [`common`] | `swiftsignals.common` | shared enums and parameter messages |
//! | [`user`] | `swiftsignals.user` | `UserService` |
//! | [`intersection`] | `swiftsignals.intersection` | `IntersectionService` |
//! | [`optimisation`] | `swiftsignals.optimisation` | `OptimisationService` |
//! | [`simulation`] | `swiftsignals.simulation` | `SimulationService` |
//!
//! `google.protobuf.Empty` is represented by `()`.

#![allow(missing_docs)]

pub mod common;
pub mod intersection;
pub mod optimisation;
pub mod simulation;
pub mod user;
