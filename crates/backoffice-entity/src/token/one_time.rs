//! Single-use tokens for password reset and email verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// What a one-time token authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_purpose", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Set a new password without knowing the current one.
    PasswordReset,
    /// Confirm ownership of the account email.
    EmailVerification,
}

impl TokenPurpose {
    /// Return the purpose as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::EmailVerification => "email_verification",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored single-use token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OneTimeToken {
    /// SHA-256 hex digest of the token value.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// The user the token acts on.
    pub user_id: Uuid,
    /// What the token authorizes.
    pub purpose: TokenPurpose,
    /// When the token was minted.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl OneTimeToken {
    /// Whether the token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
