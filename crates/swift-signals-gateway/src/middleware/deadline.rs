//! Handling timeout for standard routes.
//!
//! [`stamp_deadline`] records the timeout on the [`RequestScope`] so RPC deadlines
//! never outlive the request; [`handle_timeout`] turns an elapsed timeout into a
//! `503` through the normal error writer.

use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum::BoxError;
use tower::timeout::error::Elapsed;

use swift_signals_core::{RequestScope, ServiceError};

use crate::error::ApiError;

/// Set the scope's deadline to `timeout` from now.
pub async fn stamp_deadline(
    State(timeout): State<Duration>,
    mut req: Request,
    next: Next,
) -> Response {
    let extensions = req.extensions_mut();
    if let Some(scope) = extensions.remove::<RequestScope>() {
        extensions.insert(scope.with_deadline(Instant::now() + timeout));
    }
    next.run(req).await
}

/// Error handler for the timeout layer.
pub async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ServiceError::unavailable("request timed out").into()
    } else {
        ApiError::Unhandled(err.to_string())
    }
}
