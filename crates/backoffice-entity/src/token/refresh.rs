//! Refresh token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored refresh token.
///
/// Only the SHA-256 hash of the opaque value is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Record identifier.
    pub id: Uuid,
    /// SHA-256 hex digest of the opaque token value.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Owning user.
    pub user_id: Uuid,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// User-Agent header at issuance.
    pub user_agent: Option<String>,
    /// Client address at issuance.
    pub ip_address: Option<String>,
    /// Whether the long remember-me lifetime was granted.
    pub remember_me: bool,
    /// Last time the token minted an access token.
    pub last_used_at: Option<DateTime<Utc>>,
    /// When the token was revoked, if it was.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Whether the token can still mint access tokens at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }

    /// Whether the record can be purged at `now`.
    pub fn is_purgeable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_some() || now >= self.expires_at
    }
}

/// Request metadata a refresh token is bound to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
}
