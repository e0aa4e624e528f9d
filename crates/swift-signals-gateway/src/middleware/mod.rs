//! The middleware chain.
//!
//! Outermost first: [`cors`], [`logging`], [`auth`]. Standard routes additionally run
//! under the handling timeout installed by [`deadline`].

pub mod auth;
pub mod cors;
pub mod deadline;
pub mod logging;

pub use auth::{authenticate, is_public_path, PUBLIC_PATH_PREFIXES};
pub use cors::{cors_layer, preflight_no_content};
pub use deadline::{handle_timeout, stamp_deadline};
pub use logging::{request_tracing, seed_scope, REQUEST_ID_HEADER};
