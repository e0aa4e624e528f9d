//! HTTP request handlers.
//!
//! Each handler decodes and validates its input, reads the caller from the
//! [`RequestScope`](swift_signals_core::RequestScope), calls exactly one service method
//! and writes the result.

pub mod admin;
pub mod auth;
pub mod health;
pub mod intersections;
pub mod profile;
pub mod simulation;
