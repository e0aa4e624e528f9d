//! Registration, login, logout and password reset.

use std::sync::Arc;

use async_trait::async_trait;
use swift_signals_core::{LoginResponse, MessageResponse, RegisterResponse, RequestScope, Result};
use swift_signals_rpc::UserClient;

/// Account entry points that do not require an existing session (except logout).
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account.
    ///
    /// # Errors
    ///
    /// `already_exists` if the email is taken.
    async fn register(
        &self,
        scope: &RequestScope,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse>;

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// `unauthorized` for bad credentials, `not_found` for an unknown email,
    /// `forbidden` for a locked account.
    async fn login(&self, scope: &RequestScope, email: &str, password: &str)
        -> Result<LoginResponse>;

    /// End the caller's session.
    async fn logout(&self, scope: &RequestScope, user_id: &str) -> Result<MessageResponse>;

    /// Start the password-reset flow.
    async fn reset_password(&self, scope: &RequestScope, email: &str) -> Result<MessageResponse>;
}

/// [`AuthService`] backed by the user service.
pub struct RpcAuthService {
    users: Arc<dyn UserClient>,
}

impl RpcAuthService {
    /// Create the service.
    #[must_use]
    pub fn new(users: Arc<dyn UserClient>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthService for RpcAuthService {
    async fn register(
        &self,
        scope: &RequestScope,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse> {
        tracing::debug!(email, "calling user service to register user");
        let user = self
            .users
            .register_user(scope, username, email, password)
            .await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(RegisterResponse { user_id: user.id })
    }

    async fn login(
        &self,
        scope: &RequestScope,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse> {
        tracing::debug!(email, "calling user service to log in user");
        let login = self.users.login_user(scope, email, password).await?;
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token: login.token,
        })
    }

    async fn logout(&self, scope: &RequestScope, user_id: &str) -> Result<MessageResponse> {
        tracing::debug!(user_id, "calling user service to log out user");
        self.users.logout_user(scope, user_id).await?;
        Ok(MessageResponse::new("Logout successful"))
    }

    async fn reset_password(&self, scope: &RequestScope, email: &str) -> Result<MessageResponse> {
        tracing::debug!(email, "calling user service to reset password");
        self.users.reset_password(scope, email).await?;
        Ok(MessageResponse::new(
            "Password reset instructions sent to your email.",
        ))
    }
}
