//! Access token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use backoffice_entity::permission::{Permission, PermissionSet};
use backoffice_entity::user::{User, UserRole};

/// The exact claim set of an access token. Tokens carrying any other
/// claim fail to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessClaims {
    /// Subject (the user ID).
    pub sub: Uuid,
    /// Email at issuance.
    pub email: String,
    /// Role at issuance.
    pub role: UserRole,
    /// Permissions at issuance.
    pub permissions: PermissionSet,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl AccessClaims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Whether the token grants `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// The user facts an access token is minted from.
#[derive(Debug, Clone)]
pub struct AccessTokenSubject {
    /// User ID.
    pub user_id: Uuid,
    /// Email.
    pub email: String,
    /// Role.
    pub role: UserRole,
    /// Permissions.
    pub permissions: PermissionSet,
}

impl From<&User> for AccessTokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            permissions: user.permissions.clone(),
        }
    }
}
