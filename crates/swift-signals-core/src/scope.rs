//! Per-request context.
//!
//! A `RequestScope` is created by the logging middleware, extended by the
//! authentication middleware and then handed, by reference, to every handler,
//! service and RPC client that works on the request.

use std::time::{Duration, Instant};

use crate::error::{Result, ServiceError};

/// The role claim value that unlocks admin routes.
pub const ADMIN_ROLE: &str = "admin";

/// Context for a single in-flight request.
#[derive(Debug, Clone)]
pub struct RequestScope {
    request_id: String,
    span: tracing::Span,
    user_id: Option<String>,
    role: Option<String>,
    deadline: Option<Instant>,
}

impl RequestScope {
    /// Create a scope for the given request ID with no span, identity or deadline.
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            span: tracing::Span::none(),
            user_id: None,
            role: None,
            deadline: None,
        }
    }

    /// Bind the request's tracing span.
    #[must_use]
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Set the absolute deadline by which the request must be answered.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Record the authenticated caller.
    pub fn authenticate(&mut self, user_id: impl Into<String>, role: Option<String>) {
        self.user_id = Some(user_id.into());
        self.role = role;
    }

    /// The request correlation ID.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The request's tracing span.
    #[must_use]
    pub const fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// The authenticated user ID, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The authenticated user ID.
    ///
    /// # Errors
    ///
    /// Returns an `internal` error if the scope was never authenticated. Routes that
    /// need a caller sit behind the authentication middleware, so this is a wiring bug.
    pub fn require_user_id(&self) -> Result<&str> {
        self.user_id()
            .ok_or_else(|| ServiceError::internal("user ID missing inside of handler"))
    }

    /// The caller's role claim, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Whether the caller's role is `admin`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(ADMIN_ROLE)
    }

    /// The absolute deadline, if one was set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. Zero once it has passed; `None` without a deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The stricter of the caller's remaining time and `limit`.
    #[must_use]
    pub fn bounded(&self, limit: Duration) -> Duration {
        self.remaining().map_or(limit, |remaining| remaining.min(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn unauthenticated_scope() {
        let scope = RequestScope::new("req-1");
        assert_eq!(scope.request_id(), "req-1");
        assert!(scope.user_id().is_none());
        assert!(!scope.is_admin());

        let err = scope.require_user_id().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn admin_role() {
        let mut scope = RequestScope::new("req-1");
        scope.authenticate("u-1", Some("admin".into()));
        assert!(scope.is_admin());
        assert_eq!(scope.require_user_id().unwrap(), "u-1");

        scope.authenticate("u-2", Some("user".into()));
        assert!(!scope.is_admin());

        scope.authenticate("u-3", None);
        assert!(!scope.is_admin());
        assert_eq!(scope.role(), None);
    }

    #[test]
    fn bounded_without_deadline_uses_limit() {
        let scope = RequestScope::new("req-1");
        assert_eq!(scope.bounded(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn bounded_picks_stricter_deadline() {
        let scope =
            RequestScope::new("req-1").with_deadline(Instant::now() + Duration::from_secs(2));
        assert!(scope.bounded(Duration::from_secs(5)) <= Duration::from_secs(2));

        let scope =
            RequestScope::new("req-1").with_deadline(Instant::now() + Duration::from_secs(60));
        assert_eq!(scope.bounded(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn expired_deadline_is_zero() {
        let past = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);
        let scope = RequestScope::new("req-1").with_deadline(past);
        assert_eq!(scope.remaining(), Some(Duration::ZERO));
    }
}
