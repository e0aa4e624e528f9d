//! Request extractors.
//!
//! These replace axum's stock extractors so that every rejection is rendered by
//! [`ApiError`] with the uniform JSON body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use swift_signals_core::{RequestScope, ServiceError};

use crate::error::ApiError;
use crate::validation::Validate;

/// The per-request scope set up by the middleware chain.
#[derive(Debug, Clone)]
pub struct Scope(pub RequestScope);

impl<S> FromRequestParts<S> for Scope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestScope>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ServiceError::internal("request scope missing inside of handler").into())
    }
}

/// A JSON body that decoded and passed [`Validate`].
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::warn!(error = %rejection.body_text(), "failed to decode request body");
                ServiceError::validation("Invalid request payload")
                    .with_context("reason", rejection.body_text())
            })?;

        value.validate().inspect_err(|err| {
            tracing::warn!(error = %err, "validation failed");
        })?;
        Ok(Self(value))
    }
}

/// A query string that decoded and passed [`Validate`].
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                ServiceError::validation("Invalid query parameters")
                    .with_context("reason", rejection.body_text())
            })?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// The `{id}` path segment, trimmed and non-empty.
#[derive(Debug, Clone)]
pub struct PathId(pub String);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ServiceError::validation("invalid path parameter")
                    .with_context("reason", rejection.body_text())
            })?;

        let id = id.trim();
        if id.is_empty() {
            return Err(ServiceError::validation("id is required").into());
        }
        Ok(Self(id.to_string()))
    }
}
