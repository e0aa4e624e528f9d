//! Bearer-token validation for the Swift Signals gateway.
//!
//! Tokens are issued by the user service and signed with a shared HMAC-SHA256
//! secret. The gateway only ever validates them; the secret is loaded once at
//! startup and lives inside the validator, never in process-wide state.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway        │────▶│   JwtValidator   │
//! │   (auth layer)   │     │   (trait)        │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │ HmacJwtValidator │
//!                          │ (HS256, secret)  │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use swift_signals_auth::{HmacJwtValidator, JwtValidator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = HmacJwtValidator::new(b"change-me");
//!
//! let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...";
//! let claims = validator.validate(token).await?;
//!
//! println!("user: {} admin: {}", claims.user_id, claims.is_admin());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod jwt;

pub use error::{AuthError, Result};
pub use jwt::{
    HmacJwtValidator, JwtValidator, ValidatedClaims, TOKEN_AUDIENCE, TOKEN_ISSUER, TOKEN_TTL,
};

#[cfg(any(test, feature = "test-utils"))]
pub use jwt::{issue_token, issue_token_with_ttl, MockJwtValidator};
