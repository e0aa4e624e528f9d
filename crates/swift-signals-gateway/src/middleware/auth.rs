//! Bearer-token authentication.
//!
//! Every path outside [`PUBLIC_PATH_PREFIXES`] needs an `Authorization: Bearer <jwt>`
//! header. The validated user ID and role are recorded on the request's
//! [`RequestScope`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use swift_signals_auth::AuthError;
use swift_signals_core::{RequestScope, ServiceError};

use crate::error::ApiError;
use crate::state::GatewayState;

/// Path prefixes served without authentication.
pub const PUBLIC_PATH_PREFIXES: [&str; 5] =
    ["/login", "/register", "/reset-password", "/docs", "/health"];

/// Whether `path` is served without authentication.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Extract the token from an `Authorization` header value.
fn bearer_token(value: Option<&header::HeaderValue>) -> Result<&str, AuthError> {
    let value = value.ok_or(AuthError::MissingHeader)?;
    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedHeader)
}

/// Authentication middleware.
///
/// # Errors
///
/// Returns `unauthorized` if the header is missing or malformed, or the token does not
/// validate.
pub async fn authenticate(
    State(state): State<Arc<GatewayState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public_path(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers().get(header::AUTHORIZATION))
        .map(str::to_string)
        .inspect_err(|err| {
            tracing::warn!(error = %err, "authorization header rejected");
        })?;
    let claims = state.jwt_validator.validate(&token).await.inspect_err(|err| {
        tracing::warn!(error = %err, "token rejected");
    })?;

    let scope = req
        .extensions_mut()
        .get_mut::<RequestScope>()
        .ok_or_else(|| ServiceError::internal("request scope missing in authentication"))?;
    scope.authenticate(claims.user_id, claims.role);
    tracing::debug!(
        user_id = scope.user_id().unwrap_or_default(),
        role = scope.role().unwrap_or("none"),
        "request authenticated"
    );

    Ok(next.run(req).await)
}
