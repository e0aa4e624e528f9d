//! Registration, login, logout and password reset.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;

use swift_signals_core::Result;

use crate::error::{ApiResult, JsonResponse};
use crate::extract::{Scope, ValidatedJson};
use crate::state::GatewayState;
use crate::validation::{self, Validate};

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Display name, 3 to 32 characters.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password, 8 to 64 characters.
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        validation::length("username", &self.username, 3, 32)?;
        validation::email("email", &self.email)?;
        validation::length("password", &self.password, 8, 64)
    }
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<()> {
        validation::email("email", &self.email)?;
        validation::required("password", &self.password)
    }
}

/// Body of `POST /reset-password`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    /// Email address of the account.
    pub email: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<()> {
        validation::email("email", &self.email)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user.
///
/// # Errors
///
/// `already_exists` if the email is taken.
pub async fn register(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "auth", action = "register", "processing request");

    let response = state
        .auth
        .register(&scope, &body.username, &body.email, &body.password)
        .await?;

    tracing::info!(user_id = %response.user_id, "user registered");
    Ok(JsonResponse::created(response))
}

/// Exchange credentials for a bearer token.
///
/// # Errors
///
/// `unauthorized` for bad credentials, `not_found` for an unknown email.
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "auth", action = "login", "processing request");

    let response = state.auth.login(&scope, &body.email, &body.password).await?;
    Ok(JsonResponse::ok(response))
}

/// End the caller's session.
///
/// # Errors
///
/// Returns an error if the user service rejects the logout.
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "auth", action = "logout", "processing request");

    let user_id = scope.require_user_id()?;
    let response = state.auth.logout(&scope, user_id).await?;
    Ok(JsonResponse::ok(response))
}

/// Start the password-reset flow.
///
/// # Errors
///
/// Returns an error if the user service rejects the request.
pub async fn reset_password(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    ValidatedJson(body): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "auth", action = "reset_password", "processing request");

    let response = state.auth.reset_password(&scope, &body.email).await?;
    Ok(JsonResponse::ok(response))
}
