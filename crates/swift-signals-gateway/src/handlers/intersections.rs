//! Intersection management (`/intersections`).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use swift_signals_core::{Details, Result, SimulationParameters};
use swift_signals_service::{CreateIntersection, IntersectionUpdate};

use crate::error::{ApiResult, JsonResponse};
use crate::extract::{PathId, Scope, ValidatedJson};
use crate::state::GatewayState;
use crate::validation::{self, Validate};

/// Longest accepted intersection name.
pub const MAX_NAME_LENGTH: usize = 256;

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /intersections`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntersectionRequest {
    /// Human-readable name.
    pub name: String,
    /// Location.
    #[serde(default)]
    pub details: Details,
    /// `low`, `medium` or `high`.
    #[serde(default)]
    pub traffic_density: String,
    /// Baseline simulation parameters.
    pub default_parameters: SimulationParameters,
}

impl Validate for CreateIntersectionRequest {
    fn validate(&self) -> Result<()> {
        validation::required("name", &self.name)?;
        validation::max_length("name", &self.name, MAX_NAME_LENGTH)?;

        let params = &self.default_parameters;
        validation::required("intersection_type", &params.intersection_type)?;
        validation::at_least("green", params.green, 1)?;
        validation::at_least("yellow", params.yellow, 1)?;
        validation::at_least("red", params.red, 1)?;
        validation::at_least("speed", params.speed, 1)
    }
}

impl From<CreateIntersectionRequest> for CreateIntersection {
    fn from(body: CreateIntersectionRequest) -> Self {
        Self {
            name: body.name,
            details: body.details,
            traffic_density: body.traffic_density,
            default_parameters: body.default_parameters,
        }
    }
}

/// Body of `PATCH /intersections/{id}`. Absent fields and an empty name are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateIntersectionRequest {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New location.
    #[serde(default)]
    pub details: Option<Details>,
}

impl Validate for UpdateIntersectionRequest {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validation::max_length("name", name, MAX_NAME_LENGTH)?;
        }
        Ok(())
    }
}

impl From<UpdateIntersectionRequest> for IntersectionUpdate {
    fn from(body: UpdateIntersectionRequest) -> Self {
        Self {
            name: body.name.filter(|name| !name.is_empty()),
            details: body.details,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List intersections.
///
/// # Errors
///
/// `internal` if the listing stream breaks.
pub async fn list_intersections(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "intersection", action = "list", "processing request");

    let user_id = scope.require_user_id()?;
    let intersections = state.intersections.get_all(&scope, user_id).await?;
    Ok(JsonResponse::ok(intersections))
}

/// Create an intersection owned by the caller.
///
/// # Errors
///
/// `validation` for a bad body.
pub async fn create_intersection(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    ValidatedJson(body): ValidatedJson<CreateIntersectionRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "intersection", action = "create", "processing request");

    let user_id = scope.require_user_id()?;
    let response = state
        .intersections
        .create(&scope, user_id, &body.into())
        .await?;

    tracing::info!(intersection_id = %response.id, "intersection created");
    Ok(JsonResponse::created(response))
}

/// Fetch one of the caller's intersections.
///
/// # Errors
///
/// `forbidden` if the intersection is not the caller's.
pub async fn get_intersection(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "intersection", action = "get", intersection_id = %id, "processing request");

    let user_id = scope.require_user_id()?;
    let intersection = state.intersections.get_by_id(&scope, user_id, &id).await?;
    Ok(JsonResponse::ok(intersection))
}

/// Update one of the caller's intersections.
///
/// # Errors
///
/// `forbidden` if the intersection is not the caller's.
pub async fn update_intersection(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(id): PathId,
    ValidatedJson(body): ValidatedJson<UpdateIntersectionRequest>,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "intersection", action = "update", intersection_id = %id, "processing request");

    let user_id = scope.require_user_id()?;
    let intersection = state
        .intersections
        .update_by_id(&scope, user_id, &id, &body.into())
        .await?;
    Ok(JsonResponse::ok(intersection))
}

/// Delete one of the caller's intersections.
///
/// # Errors
///
/// `forbidden` if the intersection is not the caller's.
pub async fn delete_intersection(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "intersection", action = "delete", intersection_id = %id, "processing request");

    let user_id = scope.require_user_id()?;
    state.intersections.delete_by_id(&scope, user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run an optimisation and record the outcome.
///
/// Not subject to the standard handling timeout; bounded by the optimisation
/// deadline instead.
///
/// # Errors
///
/// `forbidden` if the intersection is not the caller's.
pub async fn optimise_intersection(
    State(state): State<Arc<GatewayState>>,
    Scope(scope): Scope,
    PathId(id): PathId,
) -> ApiResult<impl IntoResponse> {
    tracing::info!(handler = "intersection", action = "optimise", intersection_id = %id, "processing request");

    let user_id = scope.require_user_id()?;
    let response = state
        .intersections
        .optimise_by_id(&scope, user_id, &id)
        .await?;

    tracing::info!(intersection_id = %id, improved = response.improved, "optimisation finished");
    Ok(JsonResponse::ok(response))
}
