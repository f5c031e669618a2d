//! API key entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::key_type::ApiKeyType;
use crate::permission::PermissionSet;

/// A stored API key. The secret itself is never kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Record identifier.
    pub id: Uuid,
    /// SHA-256 hex digest of the secret.
    #[serde(skip_serializing)]
    pub key_hash: String,
    /// Leading characters of the secret, for display.
    pub prefix: String,
    /// Human-readable name.
    pub name: String,
    /// The preset this key was created from.
    pub key_type: ApiKeyType,
    /// Granted permissions.
    pub permissions: PermissionSet,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Whether the key currently authenticates.
    pub is_active: bool,
    /// When the key was created.
    pub created_at: DateTime<Utc>,
    /// Last successful authentication.
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// The client-facing projection of this key.
    pub fn view(&self) -> ApiKeyView {
        ApiKeyView::from(self)
    }
}

/// Data required to create a new key.
#[derive(Debug, Clone)]
pub struct CreateApiKey {
    /// SHA-256 hex digest of the secret.
    pub key_hash: String,
    /// Display prefix.
    pub prefix: String,
    /// Name.
    pub name: String,
    /// Key type.
    pub key_type: ApiKeyType,
    /// Granted permissions.
    pub permissions: PermissionSet,
    /// Description.
    pub description: Option<String>,
}

/// API key metadata exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    /// Key ID.
    pub id: Uuid,
    /// Display prefix.
    pub prefix: String,
    /// Name.
    pub name: String,
    /// Key type.
    #[serde(rename = "type")]
    pub key_type: ApiKeyType,
    /// Granted permissions.
    pub permissions: PermissionSet,
    /// Description.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last use.
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&ApiKey> for ApiKeyView {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: key.id,
            prefix: key.prefix.clone(),
            name: key.name.clone(),
            key_type: key.key_type,
            permissions: key.permissions.clone(),
            description: key.description.clone(),
            is_active: key.is_active,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
        }
    }
}
