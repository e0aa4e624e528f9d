//! Authentication error types.

use swift_signals_core::ServiceError;
use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The `Authorization` header is absent.
    #[error("missing authorization header")]
    MissingHeader,

    /// The `Authorization` header is not of the form `Bearer <token>`.
    #[error("authorization header must use the Bearer scheme")]
    MalformedHeader,

    /// The token has expired.
    #[error("token expired")]
    TokenExpired,

    /// The token signature does not match the secret.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token could not be decoded.
    #[error("invalid token format: {0}")]
    InvalidToken(String),

    /// The token carries neither a `sub` nor a `user_id` claim.
    #[error("user ID missing in jwt")]
    MissingUserId,

    /// Token issuing failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Internal(_) => 500,
            _ => 401,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeader | AuthError::MalformedHeader => {
                Self::unauthorized(format!("failed to authorize: {err}"))
            }
            AuthError::TokenExpired
            | AuthError::InvalidSignature
            | AuthError::InvalidToken(_) => {
                let reason = err.to_string();
                Self::unauthorized("invalid token").with_context("reason", reason)
            }
            AuthError::MissingUserId => Self::unauthorized(err.to_string()),
            AuthError::Internal(_) => Self::internal(err.to_string()).with_cause(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swift_signals_core::ErrorKind;

    #[test]
    fn header_errors_keep_reason() {
        let err = ServiceError::from(AuthError::MissingHeader);
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), "failed to authorize: missing authorization header");
    }

    #[test]
    fn token_errors_are_uniform() {
        for auth_err in [
            AuthError::TokenExpired,
            AuthError::InvalidSignature,
            AuthError::InvalidToken("bad base64".into()),
        ] {
            let err = ServiceError::from(auth_err);
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
            assert_eq!(err.message(), "invalid token");
        }
    }

    #[test]
    fn missing_user_id() {
        let err = ServiceError::from(AuthError::MissingUserId);
        assert_eq!(err.message(), "user ID missing in jwt");
        assert_eq!(AuthError::MissingUserId.http_status_code(), 401);
    }
}
