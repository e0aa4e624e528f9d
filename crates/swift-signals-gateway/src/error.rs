//! API error type and the JSON response writer.
//!
//! Every non-2xx response the gateway produces goes through [`ApiError`] and carries
//! the same body: `{"code": <status>, "message": "..."}`. Messages of `internal`
//! failures are replaced with a generic string; the real error only reaches the log.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use swift_signals_auth::AuthError;
use swift_signals_core::{ErrorKind, ServiceError};

/// Message sent in place of any internal error.
pub const GENERIC_MESSAGE: &str = "something went wrong";

const FALLBACK_BODY: &str = r#"{"code":500,"message":"something went wrong"}"#;

/// Result type returned by handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A classified failure.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The path exists but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// A failure outside the taxonomy.
    #[error("unhandled error: {0}")]
    Unhandled(String),
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(err) => status_for(err.kind()),
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message the client sees.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Service(err) if err.kind() != ErrorKind::Internal => err.message(),
            Self::MethodNotAllowed => "method not allowed",
            _ => GENERIC_MESSAGE,
        }
    }

    fn log(&self) {
        match self {
            Self::Service(err) => {
                let status = status_for(err.kind()).as_u16();
                if status >= 500 {
                    tracing::error!(
                        kind = %err.kind(),
                        status,
                        context = ?err.context(),
                        cause = ?std::error::Error::source(err).map(ToString::to_string),
                        "{}",
                        err.message()
                    );
                } else {
                    tracing::warn!(
                        kind = %err.kind(),
                        status,
                        context = ?err.context(),
                        "{}",
                        err.message()
                    );
                }
            }
            Self::MethodNotAllowed => {
                tracing::warn!(status = 405, "method not allowed");
            }
            Self::Unhandled(reason) => {
                tracing::error!(error = %reason, "unhandled error");
            }
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = ErrorResponse {
            code: status.as_u16(),
            message: self.public_message().to_string(),
        };

        JsonResponse::new(status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Service(err.into())
    }
}

// =============================================================================
// JSON Responses
// =============================================================================

/// A JSON body with its status.
///
/// Encoding failures are answered with a plain 500 [`ErrorResponse`] instead of the
/// intended status, so no serializer message ever leaks.
#[derive(Debug, Clone)]
pub struct JsonResponse<T> {
    status: StatusCode,
    body: T,
}

impl<T> JsonResponse<T> {
    /// A body with an explicit status.
    pub const fn new(status: StatusCode, body: T) -> Self {
        Self { status, body }
    }

    /// `200 OK`.
    pub const fn ok(body: T) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// `201 Created`.
    pub const fn created(body: T) -> Self {
        Self::new(StatusCode::CREATED, body)
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_static("application/json");
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => (self.status, [(header::CONTENT_TYPE, content_type)], bytes).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, content_type)],
                    FALLBACK_BODY,
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::body::to_bytes;
    use serde::ser::Error as _;
    use serde::Serializer;

    use super::*;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn every_kind_renders_its_status() {
        for kind in ErrorKind::ALL {
            let response =
                ApiError::from(ServiceError::new(kind, "boom")).into_response();
            let status = response.status();
            assert_eq!(status.as_u16(), kind.status_code(), "{kind}");
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "application/json"
            );

            let body = body_of(response).await;
            assert_eq!(body.code, status.as_u16());
            if kind == ErrorKind::Internal {
                assert_eq!(body.message, GENERIC_MESSAGE);
            } else {
                assert_eq!(body.message, "boom");
            }
        }
    }

    #[tokio::test]
    async fn unhandled_is_redacted() {
        let response = ApiError::Unhandled("db password=hunter2".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.message, GENERIC_MESSAGE);
    }

    #[tokio::test]
    async fn auth_errors_are_unauthorized() {
        let response = ApiError::from(AuthError::MissingHeader).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_of(response).await;
        assert_eq!(body.message, "failed to authorize: missing authorization header");
    }

    #[tokio::test]
    async fn method_not_allowed_is_405() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_of(response).await;
        assert_eq!(body.code, 405);
        assert_eq!(body.message, "method not allowed");
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    #[tokio::test]
    async fn encode_failure_falls_back_to_500() {
        let response = JsonResponse::created(Unencodable).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.code, 500);
        assert_eq!(body.message, GENERIC_MESSAGE);
    }

    #[test]
    fn json_response_keeps_status() {
        let response = JsonResponse::created(BTreeMap::from([("id", "int-1")])).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
