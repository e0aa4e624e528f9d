//! The caller's own account (`/me`).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use swift_signals_core::Result;
use swift_signals_service::UserUpdate;

use crate::error::{ApiResult, JsonResponse};
use crate::extract::{Scope, ValidatedJson};
use crate::state::GatewayState;
use crate::validation::{self, Validate};

/// Body of `PATCH /me` and `PATCH /admin/users/{id}`. Absent or empty fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name, 3 to 32 characters.
    #[serde(default)]
    pub username: Option<String>,
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// The partial update to apply.
    #[must_use]
    pub fn into_update(self) -> UserUpdate {
        UserUpdate {
            username: self.username.filter(|username| !username.is_empty()),
            email: self.email.filter(|email| !email.is_empty()),
        }
    }
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<()> {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            validation::length("username", username, 3, 32)?;
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            validation::email("email", email)?;
        }
        Ok(())
    }
}

/// Fetch the caller's profile.
///
/// # Errors
///
/// `not_found` if the user no longer exists.
pub async fn get_profile(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "profile", action = "get_profile", "processing request");

    let user_id = scope.require_user_id()?;
    let user = state.profiles.get_profile(&scope, user_id).await?;
    Ok(JsonResponse::ok(user))
}

/// Update the caller's profile.
///
/// # Errors
///
/// `validation` for bad field values; `already_exists` if the new email is taken.
pub async fn update_profile(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "profile", action = "update_profile", "processing request");

    let user_id = scope.require_user_id()?;
    let user = state
        .profiles
        .update_profile(&scope, user_id, &body.into_update())
        .await?;
    Ok(JsonResponse::ok(user))
}

/// Delete the caller's account.
///
/// # Errors
///
/// Returns an error if the user service rejects the deletion.
pub async fn delete_profile(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "profile", action = "delete_profile", "processing request");

    let user_id = scope.require_user_id()?;
    state.profiles.delete_profile(&scope, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_mean_unchanged() {
        let body: UpdateUserRequest =
            serde_json::from_str(r#"{"username":"","email":"new@x.com"}"#).unwrap();
        assert!(body.validate().is_ok());

        let update = body.into_update();
        assert_eq!(update.username, None);
        assert_eq!(update.email.as_deref(), Some("new@x.com"));
    }

    #[test]
    fn present_fields_are_validated() {
        let body: UpdateUserRequest = serde_json::from_str(r#"{"username":"ab"}"#).unwrap();
        assert!(body.validate().is_err());

        let body: UpdateUserRequest = serde_json::from_str(r#"{"email":"nope"}"#).unwrap();
        assert!(body.validate().is_err());

        let body: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(body.validate().is_ok());
    }
}
