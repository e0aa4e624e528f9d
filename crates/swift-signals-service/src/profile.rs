//! The calling user's own account.

use std::sync::Arc;

use async_trait::async_trait;
use swift_signals_core::{RequestScope, Result, User};
use swift_signals_rpc::convert::user_from_wire;
use swift_signals_rpc::UserClient;

/// A partial update of a user. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// New display name.
    pub username: Option<String>,
    /// New email address.
    pub email: Option<String>,
}

impl UserUpdate {
    pub(crate) fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub(crate) fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

/// Operations on the calling user's account.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Fetch the user.
    async fn get_profile(&self, scope: &RequestScope, user_id: &str) -> Result<User>;

    /// Apply a partial update and return the result.
    async fn update_profile(
        &self,
        scope: &RequestScope,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<User>;

    /// Delete the user.
    async fn delete_profile(&self, scope: &RequestScope, user_id: &str) -> Result<()>;
}

/// [`ProfileService`] backed by the user service.
pub struct RpcProfileService {
    users: Arc<dyn UserClient>,
}

impl RpcProfileService {
    /// Create the service.
    #[must_use]
    pub fn new(users: Arc<dyn UserClient>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ProfileService for RpcProfileService {
    async fn get_profile(&self, scope: &RequestScope, user_id: &str) -> Result<User> {
        tracing::debug!(user_id, "calling user service to get profile");
        let user = self.users.get_user_by_id(scope, user_id).await?;
        Ok(user_from_wire(user))
    }

    async fn update_profile(
        &self,
        scope: &RequestScope,
        user_id: &str,
        update: &UserUpdate,
    ) -> Result<User> {
        tracing::debug!(user_id, "calling user service to update profile");
        let user = self
            .users
            .update_user(scope, user_id, update.username(), update.email())
            .await?;
        Ok(user_from_wire(user))
    }

    async fn delete_profile(&self, scope: &RequestScope, user_id: &str) -> Result<()> {
        tracing::debug!(user_id, "calling user service to delete profile");
        self.users.delete_user(scope, user_id).await
    }
}
