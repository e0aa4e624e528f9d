//! Admin user management (`/admin/users`).
//!
//! Role enforcement lives in the admin service; these handlers only decode and
//! validate.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use swift_signals_core::Result;

use crate::error::{ApiResult, JsonResponse};
use crate::extract::{PathId, Scope, ValidatedJson, ValidatedQuery};
use crate::handlers::profile::UpdateUserRequest;
use crate::state::GatewayState;
use crate::validation::{self, Validate};

/// Largest page an admin may request.
pub const MAX_PAGE_SIZE: i32 = 100;

/// Query of `GET /admin/users`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// Page number, from 1.
    pub page: i32,
    /// Users per page, 1 to 100.
    pub page_size: i32,
}

impl Validate for PageQuery {
    fn validate(&self) -> Result<()> {
        validation::at_least("page", self.page, 1)?;
        validation::between("page_size", self.page_size, 1, MAX_PAGE_SIZE)
    }
}

/// List one page of users.
///
/// # Errors
///
/// `forbidden` unless the caller is an admin.
pub async fn list_users(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(
        handler = "admin",
        action = "list_users",
        page = query.page,
        page_size = query.page_size,
        "processing request"
    );

    let users = state
        .admin
        .get_all_users(&scope, query.page, query.page_size)
        .await?;
    Ok(JsonResponse::ok(users))
}

/// Fetch any user.
///
/// # Errors
///
/// `forbidden` unless the caller is an admin.
pub async fn get_user(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(user_id): PathId,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "admin", action = "get_user", user_id = %user_id, "processing request");

    let user = state.admin.get_user_by_id(&scope, &user_id).await?;
    Ok(JsonResponse::ok(user))
}

/// Update any user.
///
/// # Errors
///
/// `forbidden` unless the caller is an admin.
pub async fn update_user(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(user_id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "admin", action = "update_user", user_id = %user_id, "processing request");

    let user = state
        .admin
        .update_user_by_id(&scope, &user_id, &body.into_update())
        .await?;
    Ok(JsonResponse::ok(user))
}

/// Delete any user.
///
/// # Errors
///
/// `forbidden` unless the caller is an admin.
pub async fn delete_user(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(user_id): PathId,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "admin", action = "delete_user", user_id = %user_id, "processing request");

    state.admin.delete_user_by_id(&scope, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
