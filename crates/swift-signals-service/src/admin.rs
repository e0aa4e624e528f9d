//! Admin-only user management.

use std::sync::Arc;

use async_trait::async_trait;
use swift_signals_core::{RequestScope, Result, ServiceError, User};
use swift_signals_rpc::convert::user_from_wire;
use swift_signals_rpc::UserClient;

use crate::access::drain;
use crate::profile::UserUpdate;

/// User management for admins. Every method fails with `forbidden` unless the
/// caller's role is `admin`.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// One page of users.
    ///
    /// # Errors
    ///
    /// `internal` if the listing stream breaks.
    async fn get_all_users(
        &self,
        scope: &RequestScope,
        page: i32,
        page_size: i32,
    ) -> Result<Vec<User>>;

    /// Fetch any user.
    async fn get_user_by_id(&self, scope: &RequestScope, user_id: &str) -> Result<User>;

    /// Update any user.
    async fn update_user_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<User>;

    /// Delete any user.
    async fn delete_user_by_id(&self, scope: &RequestScope, user_id: &str) -> Result<()>;
}

/// [`AdminService`] backed by the user service.
pub struct RpcAdminService {
    users: Arc<dyn UserClient>,
}

impl RpcAdminService {
    /// Create the service.
    #[must_use]
    pub fn new(users: Arc<dyn UserClient>) -> Self {
        Self { users }
    }
}

fn require_admin(scope: &RequestScope) -> Result<()> {
    if scope.is_admin() {
        return Ok(());
    }
    Err(ServiceError::forbidden("only admins can access this endpoint")
        .with_context("role", scope.role().unwrap_or("none")))
}

#[async_trait]
impl AdminService for RpcAdminService {
    async fn get_all_users(
        &self,
        scope: &RequestScope,
        page: i32,
        page_size: i32,
    ) -> Result<Vec<User>> {
        require_admin(scope)?;

        tracing::debug!(page, page_size, "calling user service to list users");
        let stream = self.users.get_all_users(scope, page, page_size, "").await?;
        let users = drain(stream, "users").await?;
        Ok(users.into_iter().map(user_from_wire).collect())
    }

    async fn get_user_by_id(&self, scope: &RequestScope, user_id: &str) -> Result<User> {
        require_admin(scope)?;

        tracing::debug!(user_id, "calling user service to get user");
        let user = self.users.get_user_by_id(scope, user_id).await?;
        Ok(user_from_wire(user))
    }

    async fn update_user_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<User> {
        require_admin(scope)?;

        tracing::debug!(user_id, "calling user service to update user");
        let user = self
            .users
            .update_user(scope, user_id, update.username(), update.email())
            .await?;
        Ok(user_from_wire(user))
    }

    async fn delete_user_by_id(&self, scope: &RequestScope, user_id: &str) -> Result<()> {
        require_admin(scope)?;

        tracing::debug!(user_id, "calling user service to delete user");
        self.users.delete_user(scope, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use swift_signals_core::ErrorKind;
    use swift_signals_rpc::proto::user::methods;
    use swift_signals_rpc::testing::FakeUserClient;

    use super::*;

    fn scope(role: Option<&str>) -> RequestScope {
        let mut scope = RequestScope::new("req");
        scope.authenticate("admin-1", role.map(str::to_string));
        scope
    }

    fn seeded() -> (Arc<FakeUserClient>, RpcAdminService) {
        let users = Arc::new(FakeUserClient::new());
        users.insert_member("u-1", &[]);
        users.insert_member("u-2", &[]);
        users.insert_member("u-3", &[]);
        (users.clone(), RpcAdminService::new(users))
    }

    #[tokio::test]
    async fn non_admins_are_rejected_before_any_call() {
        let (users, service) = seeded();

        for role in [None, Some("user"), Some("Admin")] {
            let scope = scope(role);
            let err = service.get_all_users(&scope, 1, 10).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Forbidden);
            assert_eq!(
                service.get_user_by_id(&scope, "u-1").await.unwrap_err().kind(),
                ErrorKind::Forbidden
            );
            assert_eq!(
                service
                    .update_user_by_id(&scope, "u-1", &UserUpdate::default())
                    .await
                    .unwrap_err()
                    .kind(),
                ErrorKind::Forbidden
            );
            assert_eq!(
                service.delete_user_by_id(&scope, "u-1").await.unwrap_err().kind(),
                ErrorKind::Forbidden
            );
        }
        assert!(users.calls().is_empty());
    }

    #[tokio::test]
    async fn lists_a_page() {
        let (_, service) = seeded();
        let scope = scope(Some("admin"));

        let page = service.get_all_users(&scope, 1, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        let page = service.get_all_users(&scope, 2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn broken_listing_is_internal() {
        let (users, service) = seeded();
        users.break_stream_after(methods::GET_ALL_USERS, 1);

        let err = service
            .get_all_users(&scope(Some("admin")), 1, 10)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn passthroughs() {
        let (users, service) = seeded();
        let scope = scope(Some("admin"));

        let user = service
            .update_user_by_id(
                &scope,
                "u-2",
                &UserUpdate {
                    username: None,
                    email: Some("new@x.com".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(user.email, "new@x.com");

        service.delete_user_by_id(&scope, "u-3").await.unwrap();
        assert!(users.user("u-3").is_none());
    }
}
