//! Client for the user service.

use std::time::Duration;

use async_trait::async_trait;
use swift_signals_core::{RequestScope, Result};

use crate::call::{self, ServiceStream, UNARY_TIMEOUT};
use crate::channel::{RpcChannel, RpcTransport};
use crate::proto::user::{
    methods, AddIntersectionIdRequest, GetAllUsersRequest, IntersectionIdResponse,
    LoginUserRequest, LoginUserResponse, RegisterUserRequest, RemoveIntersectionIdRequest,
    ResetPasswordRequest, UpdateUserRequest, UserIdRequest, UserResponse,
};

/// Operations on user accounts and the user-to-intersection edge.
#[async_trait]
pub trait UserClient: Send + Sync {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// `already_exists` if the email is taken.
    async fn register_user(
        &self,
        scope: &RequestScope,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse>;

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// `unauthorized` for bad credentials, `not_found` for an unknown email,
    /// `forbidden` for a locked account.
    async fn login_user(
        &self,
        scope: &RequestScope,
        email: &str,
        password: &str,
    ) -> Result<LoginUserResponse>;

    /// End the user's session on the backend.
    async fn logout_user(&self, scope: &RequestScope, user_id: &str) -> Result<()>;

    /// Fetch one user.
    async fn get_user_by_id(&self, scope: &RequestScope, user_id: &str) -> Result<UserResponse>;

    /// Stream one page of users.
    async fn get_all_users(
        &self,
        scope: &RequestScope,
        page: i32,
        page_size: i32,
        filter: &str,
    ) -> Result<ServiceStream<UserResponse>>;

    /// Update name and email. Empty strings leave a field unchanged.
    async fn update_user(
        &self,
        scope: &RequestScope,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<UserResponse>;

    /// Delete a user.
    async fn delete_user(&self, scope: &RequestScope, user_id: &str) -> Result<()>;

    /// Stream the intersection IDs on a user's record.
    async fn get_user_intersection_ids(
        &self,
        scope: &RequestScope,
        user_id: &str,
    ) -> Result<ServiceStream<IntersectionIdResponse>>;

    /// Grant a user access to an intersection.
    async fn add_intersection_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_id: &str,
    ) -> Result<()>;

    /// Revoke a user's access to several intersections.
    async fn remove_intersection_ids(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_ids: &[String],
    ) -> Result<()>;

    /// Revoke a user's access to one intersection.
    async fn remove_intersection_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_id: &str,
    ) -> Result<()> {
        self.remove_intersection_ids(scope, user_id, &[intersection_id.to_string()])
            .await
    }

    /// Start the password-reset flow.
    async fn reset_password(&self, scope: &RequestScope, email: &str) -> Result<()>;
}

/// gRPC implementation of [`UserClient`].
#[derive(Debug, Clone)]
pub struct GrpcUserClient<T: RpcTransport = RpcChannel> {
    transport: T,
    timeout: Duration,
}

impl<T: RpcTransport> GrpcUserClient<T> {
    /// Create a client with the default unary deadline.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: UNARY_TIMEOUT,
        }
    }

    /// Override the unary deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl<T: RpcTransport> UserClient for GrpcUserClient<T> {
    async fn register_user(
        &self,
        scope: &RequestScope,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse> {
        let message = RegisterUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        call::invoke(&self.transport, scope, methods::REGISTER_USER, message, self.timeout).await
    }

    async fn login_user(
        &self,
        scope: &RequestScope,
        email: &str,
        password: &str,
    ) -> Result<LoginUserResponse> {
        let message = LoginUserRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        call::invoke(&self.transport, scope, methods::LOGIN_USER, message, self.timeout).await
    }

    async fn logout_user(&self, scope: &RequestScope, user_id: &str) -> Result<()> {
        let message = UserIdRequest {
            user_id: user_id.to_string(),
        };
        call::invoke(&self.transport, scope, methods::LOGOUT_USER, message, self.timeout).await
    }

    async fn get_user_by_id(&self, scope: &RequestScope, user_id: &str) -> Result<UserResponse> {
        let message = UserIdRequest {
            user_id: user_id.to_string(),
        };
        call::invoke(&self.transport, scope, methods::GET_USER_BY_ID, message, self.timeout).await
    }

    async fn get_all_users(
        &self,
        scope: &RequestScope,
        page: i32,
        page_size: i32,
        filter: &str,
    ) -> Result<ServiceStream<UserResponse>> {
        let message = GetAllUsersRequest {
            page,
            page_size,
            filter: filter.to_string(),
        };
        call::open_stream(&self.transport, scope, methods::GET_ALL_USERS, message).await
    }

    async fn update_user(
        &self,
        scope: &RequestScope,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<UserResponse> {
        let message = UpdateUserRequest {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        };
        call::invoke(&self.transport, scope, methods::UPDATE_USER, message, self.timeout).await
    }

    async fn delete_user(&self, scope: &RequestScope, user_id: &str) -> Result<()> {
        let message = UserIdRequest {
            user_id: user_id.to_string(),
        };
        call::invoke(&self.transport, scope, methods::DELETE_USER, message, self.timeout).await
    }

    async fn get_user_intersection_ids(
        &self,
        scope: &RequestScope,
        user_id: &str,
    ) -> Result<ServiceStream<IntersectionIdResponse>> {
        let message = UserIdRequest {
            user_id: user_id.to_string(),
        };
        call::open_stream(
            &self.transport,
            scope,
            methods::GET_USER_INTERSECTION_IDS,
            message,
        )
        .await
    }

    async fn add_intersection_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_id: &str,
    ) -> Result<()> {
        let message = AddIntersectionIdRequest {
            user_id: user_id.to_string(),
            intersection_id: intersection_id.to_string(),
        };
        call::invoke(
            &self.transport,
            scope,
            methods::ADD_INTERSECTION_ID,
            message,
            self.timeout,
        )
        .await
    }

    async fn remove_intersection_ids(
        &self,
        scope: &RequestScope,
        user_id: &str,
        intersection_ids: &[String],
    ) -> Result<()> {
        let message = RemoveIntersectionIdRequest {
            user_id: user_id.to_string(),
            intersection_id: intersection_ids.to_vec(),
        };
        call::invoke(
            &self.transport,
            scope,
            methods::REMOVE_INTERSECTION_IDS,
            message,
            self.timeout,
        )
        .await
    }

    async fn reset_password(&self, scope: &RequestScope, email: &str) -> Result<()> {
        let message = ResetPasswordRequest {
            email: email.to_string(),
        };
        call::invoke(&self.transport, scope, methods::RESET_PASSWORD, message, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use futures::StreamExt;
    use swift_signals_core::ErrorKind;
    use tonic::Status;

    use super::*;
    use crate::channel::recording::RecordingTransport;

    fn scope() -> RequestScope {
        RequestScope::new("req-user")
    }

    fn assert_standard_deadline(timeout: Option<Duration>) {
        let timeout = timeout.expect("grpc-timeout missing");
        assert!(timeout > Duration::from_secs(4), "{timeout:?}");
        assert!(timeout <= Duration::from_secs(5), "{timeout:?}");
    }

    #[tokio::test]
    async fn every_unary_call_carries_a_deadline() {
        let client = GrpcUserClient::new(RecordingTransport::new());
        let scope = scope();

        client.register_user(&scope, "alice", "a@x.com", "pw12345678").await.unwrap();
        client.login_user(&scope, "a@x.com", "pw12345678").await.unwrap();
        client.logout_user(&scope, "u-1").await.unwrap();
        client.get_user_by_id(&scope, "u-1").await.unwrap();
        client.update_user(&scope, "u-1", "bob", "").await.unwrap();
        client.delete_user(&scope, "u-1").await.unwrap();
        client.add_intersection_id(&scope, "u-1", "int-1").await.unwrap();
        client.remove_intersection_id(&scope, "u-1", "int-1").await.unwrap();
        client.reset_password(&scope, "a@x.com").await.unwrap();

        let calls = client.transport.calls();
        assert_eq!(calls.len(), 9);
        for call in calls {
            assert_standard_deadline(call.timeout);
            assert_eq!(call.request_id.as_deref(), Some("req-user"));
        }
    }

    #[tokio::test]
    async fn builds_wire_requests() {
        let client = GrpcUserClient::new(RecordingTransport::new());

        client.register_user(&scope(), "alice", "a@x.com", "pw12345678").await.unwrap();
        let call = client.transport.last();
        assert_eq!(call.path, methods::REGISTER_USER);
        let request: RegisterUserRequest = call.decode();
        assert_eq!(request.name, "alice");
        assert_eq!(request.email, "a@x.com");

        client
            .remove_intersection_ids(&scope(), "u-1", &["int-1".into(), "int-2".into()])
            .await
            .unwrap();
        let request: RemoveIntersectionIdRequest = client.transport.last().decode();
        assert_eq!(request.intersection_id, vec!["int-1", "int-2"]);
    }

    #[tokio::test]
    async fn streams_have_no_added_deadline() {
        let client = GrpcUserClient::new(RecordingTransport::with_stream_items(2));

        let users: Vec<_> = client
            .get_all_users(&scope(), 1, 10, "")
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(users.len(), 2);

        let call = client.transport.last();
        assert_eq!(call.path, methods::GET_ALL_USERS);
        assert_eq!(call.timeout, None);
        let request: GetAllUsersRequest = call.decode();
        assert_eq!((request.page, request.page_size), (1, 10));
    }

    #[tokio::test]
    async fn caller_deadline_is_stricter() {
        let client = GrpcUserClient::new(RecordingTransport::new());
        let scope = scope().with_deadline(Instant::now() + Duration::from_secs(1));

        client.get_user_by_id(&scope, "u-1").await.unwrap();
        let timeout = client.transport.last().timeout.unwrap();
        assert!(timeout <= Duration::from_secs(1), "{timeout:?}");

        client.get_user_intersection_ids(&scope, "u-1").await.unwrap();
        let timeout = client.transport.last().timeout.unwrap();
        assert!(timeout <= Duration::from_secs(1), "{timeout:?}");
    }

    #[tokio::test]
    async fn backend_status_is_mapped() {
        let client = GrpcUserClient::new(RecordingTransport::new());
        client
            .transport
            .fail_with(Status::unauthenticated("invalid credentials"));

        let err = client.login_user(&scope(), "a@x.com", "wrong").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), "invalid credentials");
    }
}
