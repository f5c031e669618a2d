//! Permission and key-type vocabularies.

use serde::{Deserialize, Serialize};

use backoffice_entity::api_key::ApiKeyType;
use backoffice_entity::permission::{Permission, PermissionSet};

/// One permission in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Wire form, e.g. `clients:read`.
    pub name: String,
    /// Human description.
    pub description: String,
}

/// One key type in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTypeEntry {
    /// Type name, e.g. `read_only`.
    pub name: String,
    /// Human description.
    pub description: String,
    /// Preset permissions (empty for `custom`).
    pub permissions: PermissionSet,
}

/// Everything a client needs to build a key creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsCatalog {
    /// Known permissions.
    pub permissions: Vec<PermissionEntry>,
    /// Known key types with their presets.
    pub key_types: Vec<KeyTypeEntry>,
}

impl PermissionsCatalog {
    /// Build the catalog from the closed enumerations.
    pub fn build() -> Self {
        Self {
            permissions: Permission::ALL
                .iter()
                .map(|p| PermissionEntry {
                    name: p.as_str().to_string(),
                    description: p.description().to_string(),
                })
                .collect(),
            key_types: ApiKeyType::ALL
                .iter()
                .map(|t| KeyTypeEntry {
                    name: t.as_str().to_string(),
                    description: t.description().to_string(),
                    permissions: t.preset_permissions(),
                })
                .collect(),
        }
    }
}
