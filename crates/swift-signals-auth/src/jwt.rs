//! JWT validation and claims extraction.
//!
//! Tokens are HS256-signed by the user service with claims `sub` (user ID), `role`,
//! `iss`, `aud`, `iat`, `nbf` and `exp`. Older tokens carry the user ID in a
//! `user_id` claim instead of `sub`; both are accepted.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Issuer the user service stamps on its tokens.
pub const TOKEN_ISSUER: &str = "swift-signals";

/// Audience the user service stamps on its tokens.
pub const TOKEN_AUDIENCE: &str = "users";

/// Lifetime of a freshly issued token.
pub const TOKEN_TTL: Duration = Duration::from_secs(72 * 60 * 60);

/// Validated claims extracted from a JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedClaims {
    /// The authenticated user's ID.
    pub user_id: String,
    /// The role claim, if present.
    pub role: Option<String>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl ValidatedClaims {
    /// Whether the role claim is `admin`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(swift_signals_core::scope::ADMIN_ROLE)
    }
}

/// Trait for validating JWTs.
#[async_trait]
pub trait JwtValidator: Send + Sync {
    /// Validate a JWT and extract claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid, expired, or carries no user ID.
    async fn validate(&self, token: &str) -> Result<ValidatedClaims>;
}

/// Claims as they appear in the token.
#[derive(Debug, Serialize, Deserialize)]
struct RawClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Issuer (not enforced)
    #[allow(dead_code)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    /// Audience (not enforced; string or array)
    #[allow(dead_code)]
    #[serde(default)]
    aud: Audience,
    #[allow(dead_code)]
    #[serde(default)]
    iat: i64,
    #[allow(dead_code)]
    #[serde(default)]
    nbf: i64,
    exp: i64,
}

/// Audience claim that can be either a string or array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
enum Audience {
    Single(String),
    Multiple(Vec<String>),
    #[default]
    None,
}

/// HMAC-SHA256 JWT validator.
///
/// Signature and expiry are enforced. Issuer and audience are not: the secret is only
/// shared with the user service, which is the sole issuer.
pub struct HmacJwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl HmacJwtValidator {
    /// Create a validator for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_string());

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl std::fmt::Debug for HmacJwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacJwtValidator").finish_non_exhaustive()
    }
}

#[async_trait]
impl JwtValidator for HmacJwtValidator {
    async fn validate(&self, token: &str) -> Result<ValidatedClaims> {
        let token_data =
            decode::<RawClaims>(token, &self.key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;

        let user_id = claims
            .sub
            .filter(|s| !s.is_empty())
            .or(claims.user_id.filter(|s| !s.is_empty()))
            .ok_or(AuthError::MissingUserId)?;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".to_string()))?;

        Ok(ValidatedClaims {
            user_id,
            role: claims.role.filter(|r| !r.is_empty()),
            expires_at,
        })
    }
}

/// Mint a token the way the user service does.
///
/// # Errors
///
/// Returns `AuthError::Internal` if signing fails.
#[cfg(any(test, feature = "test-utils"))]
pub fn issue_token(secret: &[u8], user_id: &str, role: &str) -> Result<String> {
    let ttl = chrono::Duration::from_std(TOKEN_TTL)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    issue_token_with_ttl(secret, user_id, role, ttl)
}

/// Mint a token with a custom lifetime. A negative `ttl` yields an expired token.
///
/// # Errors
///
/// Returns `AuthError::Internal` if signing fails.
#[cfg(any(test, feature = "test-utils"))]
pub fn issue_token_with_ttl(
    secret: &[u8],
    user_id: &str,
    role: &str,
    ttl: chrono::Duration,
) -> Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now().timestamp();
    let claims = RawClaims {
        sub: Some(user_id.to_string()),
        user_id: Some(user_id.to_string()),
        role: Some(role.to_string()),
        iss: Some(TOKEN_ISSUER.to_string()),
        aud: Audience::Multiple(vec![TOKEN_AUDIENCE.to_string()]),
        iat: now,
        nbf: now,
        exp: now + ttl.num_seconds(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(e.to_string()))
}

/// A mock JWT validator for testing.
///
/// Accepts tokens of the form `test-token:<user_id>` or `test-token:<user_id>:<role>`.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockJwtValidator;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl JwtValidator for MockJwtValidator {
    async fn validate(&self, token: &str) -> Result<ValidatedClaims> {
        let rest = token.strip_prefix("test-token:").ok_or_else(|| {
            AuthError::InvalidToken("expected test-token:<user>[:<role>]".to_string())
        })?;

        let (user_id, role) = match rest.split_once(':') {
            Some((user, role)) => (user, Some(role.to_string())),
            None => (rest, None),
        };
        if user_id.is_empty() {
            return Err(AuthError::MissingUserId);
        }

        Ok(ValidatedClaims {
            user_id: user_id.to_string(),
            role,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn sign(claims: &serde_json::Value, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn issued_token_round_trips() {
        let validator = HmacJwtValidator::new(SECRET);
        let token = issue_token(SECRET, "user-1", "admin").unwrap();

        let claims = validator.validate(&token).await.unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert!(claims.is_admin());
        assert!(claims.expires_at > Utc::now() + chrono::Duration::hours(71));
    }

    #[tokio::test]
    async fn rejects_wrong_secret() {
        let validator = HmacJwtValidator::new(SECRET);
        let token = issue_token(b"other-secret", "user-1", "user").unwrap();

        let err = validator.validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn rejects_expired() {
        let validator = HmacJwtValidator::new(SECRET);
        let token =
            issue_token_with_ttl(SECRET, "user-1", "user", chrono::Duration::hours(-2)).unwrap();

        let err = validator.validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let validator = HmacJwtValidator::new(SECRET);
        let err = validator.validate("not.a.jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn falls_back_to_user_id_claim() {
        let validator = HmacJwtValidator::new(SECRET);
        let token = sign(
            &serde_json::json!({ "user_id": "legacy-7", "role": "user", "exp": in_one_hour() }),
            SECRET,
        );

        let claims = validator.validate(&token).await.unwrap();
        assert_eq!(claims.user_id, "legacy-7");
        assert!(!claims.is_admin());
    }

    #[tokio::test]
    async fn missing_user_id_is_rejected() {
        let validator = HmacJwtValidator::new(SECRET);
        let token = sign(
            &serde_json::json!({ "role": "admin", "exp": in_one_hour() }),
            SECRET,
        );

        let err = validator.validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingUserId));
    }

    #[tokio::test]
    async fn role_is_optional() {
        let validator = HmacJwtValidator::new(SECRET);
        let token = sign(
            &serde_json::json!({ "sub": "u-9", "exp": in_one_hour() }),
            SECRET,
        );

        let claims = validator.validate(&token).await.unwrap();
        assert_eq!(claims.role, None);
    }

    #[tokio::test]
    async fn mock_validator_parses_role() {
        let validator = MockJwtValidator;
        let claims = validator.validate("test-token:u-1:admin").await.unwrap();
        assert_eq!(claims.user_id, "u-1");
        assert!(claims.is_admin());

        let claims = validator.validate("test-token:u-2").await.unwrap();
        assert_eq!(claims.role, None);

        assert!(validator.validate("bogus").await.is_err());
    }
}
