//! Access token port.

use chrono::{DateTime, Utc};
use common::{User, UserId, UserRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Unique id of this token.
    pub id: Uuid,
    pub user_id: UserId,
    pub role: UserRole,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenPayload {
    /// Creates claims for `user` valid for `duration` from `now`.
    pub fn new(user: &User, now: DateTime<Utc>, duration: chrono::Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user.id,
            role: user.role,
            issued_at: now,
            expires_at: now + duration,
        }
    }

    /// Returns true if the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Reasons a token is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token could not be created")]
    Creation,
}

/// Issues and verifies access tokens.
pub trait TokenService: Send + Sync {
    fn create_token(&self, user: &User) -> Result<String, TokenError>;

    fn verify_token(&self, token: &str) -> Result<TokenPayload, TokenError>;
}
