//! The gateway's error taxonomy.
//!
//! Every failure that crosses a layer boundary is a [`ServiceError`] tagged with one
//! of the eight [`ErrorKind`]s. The layer closest to the origin picks the kind; upper
//! layers pass the error through unchanged and only the HTTP response writer turns the
//! kind into a status code.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A result type using `ServiceError`.
pub type Result<T> = std::result::Result<T, ServiceError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request is malformed or violates a field constraint.
    Validation,
    /// The addressed resource does not exist.
    NotFound,
    /// The resource being created already exists.
    AlreadyExists,
    /// The caller is not authenticated.
    Unauthorized,
    /// The caller is authenticated but not allowed to do this.
    Forbidden,
    /// The request conflicts with the current state of the resource.
    Conflict,
    /// A backend is unreachable or the request ran out of time.
    Unavailable,
    /// Anything else. The message never reaches the client.
    Internal,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Validation,
        Self::NotFound,
        Self::AlreadyExists,
        Self::Unauthorized,
        Self::Forbidden,
        Self::Conflict,
        Self::Unavailable,
        Self::Internal,
    ];

    /// Returns the HTTP status code this kind is rendered with.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::AlreadyExists | Self::Conflict => 409,
            Self::Unavailable => 503,
            Self::Internal => 500,
        }
    }

    /// Returns the snake-case name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxonomy error.
///
/// Carries a human-readable message, an opaque context map that is only ever logged,
/// and optionally the lower-level error that caused it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    context: BTreeMap<String, String>,
    #[source]
    cause: Option<BoxError>,
}

impl ServiceError {
    /// Create an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
            cause: None,
        }
    }

    /// Create a `validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a `not_found` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an `already_exists` error.
    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Create an `unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a `forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a `conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an `unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// Create an `internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach a key/value pair to the logging context.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attach the error that caused this one.
    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The logging context.
    #[must_use]
    pub const fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    /// Shorthand for `self.kind().status_code()`.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn status_mapping() {
        let expected = [400, 404, 409, 401, 403, 409, 503, 500];
        for (kind, status) in ErrorKind::ALL.iter().zip(expected) {
            assert_eq!(kind.status_code(), status, "{kind}");
        }
    }

    #[test]
    fn constructors_set_kind() {
        assert_eq!(ServiceError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(ServiceError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            ServiceError::already_exists("x").kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            ServiceError::unauthorized("x").kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(ServiceError::forbidden("x").kind(), ErrorKind::Forbidden);
        assert_eq!(ServiceError::conflict("x").kind(), ErrorKind::Conflict);
        assert_eq!(ServiceError::unavailable("x").kind(), ErrorKind::Unavailable);
        assert_eq!(ServiceError::internal("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn context_and_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = ServiceError::internal("unable to retrieve intersection IDs")
            .with_context("user_id", "u-1")
            .with_cause(io);

        assert_eq!(err.to_string(), "unable to retrieve intersection IDs");
        assert_eq!(err.context().get("user_id").map(String::as_str), Some("u-1"));
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk on fire"));
    }

    #[test]
    fn kind_names() {
        assert_eq!(ErrorKind::AlreadyExists.to_string(), "already_exists");
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
    }
}
