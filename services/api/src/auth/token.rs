//! services/api/src/auth/token.rs
//!
//! Stateless session tokens: HMAC-SHA256 signed JWTs binding a user id to an
//! expiration. Verification is a pure decode + signature check + expiry
//! check; nothing is persisted server-side.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signing key")]
    Key,
    #[error("failed to sign token")]
    Signing,
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}

/// The signed payload. `sub` is the user id; `iat`/`exp` are Unix
/// timestamps in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens with a server-wide secret. Built once
/// at startup from configuration.
#[derive(Clone)]
pub struct TokenSigner {
    key: Hmac<Sha256>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_days: i64) -> Result<Self, TokenError> {
        let key = Hmac::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::Key)?;
        Ok(Self {
            key,
            ttl: Duration::days(ttl_days),
        })
    }

    /// Signs a token for `user_id` with the configured validity window.
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        claims.sign_with_key(&self.key).map_err(|_| TokenError::Signing)
    }

    /// Returns the user id a token was issued for, or fails when the
    /// signature does not verify, the payload is malformed, or the token has
    /// expired. `exp` is the first second at which the token is invalid.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims: Claims = token.verify_with_key(&self.key).map_err(|_| TokenError::Invalid)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}
