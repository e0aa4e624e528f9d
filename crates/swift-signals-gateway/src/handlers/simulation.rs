//! Simulation runs of an intersection's default or best parameters.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;

use swift_signals_core::{ParameterRole, RequestScope};

use crate::error::{ApiResult, JsonResponse};
use crate::extract::{PathId, Scope};
use crate::state::GatewayState;

/// Simulate the intersection with its default parameters.
///
/// # Errors
///
/// `forbidden` if the intersection is not the caller's.
pub async fn simulate(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    run(&state, &scope, &id, ParameterRole::Default).await
}

/// Simulate the intersection with its best parameters.
///
/// # Errors
///
/// `forbidden` if the intersection is not the caller's; `not_found` if it has never
/// been optimised.
pub async fn get_optimised(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    run(&state, &scope, &id, ParameterRole::Best).await
}

async fn run(
    state: &GatewayState,
    scope: &RequestScope,
    id: &str,
    role: ParameterRole,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "simulation", action = "simulate", intersection_id = %id, %role, "processing request");

    let user_id = scope.require_user_id()?;
    let response = state
        .simulations
        .simulate(scope, user_id, id, role)
        .await?;
    Ok(JsonResponse::ok(response))
}
