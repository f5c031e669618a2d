//! API key creation, lookup, activation, and statistics.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use backoffice_core::clock::SharedClock;
use backoffice_core::error::{AppError, codes};
use backoffice_core::result::AppResult;
use backoffice_database::store::ApiKeyStore;
use backoffice_entity::api_key::{ApiKey, ApiKeyType, CreateApiKey};
use backoffice_entity::permission::{Permission, PermissionSet};

use super::catalog::PermissionsCatalog;
use crate::secret::{generate_token, hash_token};

/// Every secret starts with this marker.
pub const SECRET_PREFIX: &str = "bo_";

/// Characters of the secret kept for display.
const DISPLAY_PREFIX_LEN: usize = 11;

/// A newly created key together with its secret. The secret is never
/// retrievable again.
#[derive(Debug, Clone)]
pub struct CreatedApiKey {
    /// Stored metadata.
    pub key: ApiKey,
    /// The plaintext secret.
    pub secret: String,
}

/// Aggregate registry statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStats {
    /// Total keys.
    pub total: u64,
    /// Active keys.
    pub active: u64,
    /// Inactive keys.
    pub inactive: u64,
    /// Keys per type.
    pub by_type: BTreeMap<String, u64>,
    /// Keys per granted permission.
    pub by_permission: BTreeMap<String, u64>,
}

/// Long-lived, permission-scoped keys for machine clients.
#[derive(Debug, Clone)]
pub struct ApiKeyRegistry {
    store: Arc<dyn ApiKeyStore>,
    clock: SharedClock,
}

impl ApiKeyRegistry {
    /// Creates a registry over `store`.
    pub fn new(store: Arc<dyn ApiKeyStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Creates a key with a caller-supplied permission list.
    ///
    /// Fails with `INVALID_PERMISSIONS` naming every unknown entry; nothing
    /// is stored in that case.
    pub async fn create_custom_api_key(
        &self,
        name: &str,
        permissions: &[String],
        description: Option<&str>,
    ) -> AppResult<CreatedApiKey> {
        let permissions = PermissionSet::parse(permissions).map_err(|invalid| {
            AppError::validation(format!("Unknown permissions: {}", invalid.join(", ")))
                .with_code(codes::INVALID_PERMISSIONS)
                .with_details(serde_json::json!({
                    "invalid": invalid,
                    "valid": Permission::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                }))
        })?;
        if permissions.is_empty() {
            return Err(AppError::validation("At least one permission is required")
                .with_code(codes::INVALID_PERMISSIONS));
        }
        self.insert(name, ApiKeyType::Custom, permissions, description)
            .await
    }

    /// Creates a key from a type preset.
    pub async fn create_api_key(
        &self,
        key_type: ApiKeyType,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<CreatedApiKey> {
        if key_type == ApiKeyType::Custom {
            return Err(AppError::validation(
                "Custom keys require an explicit permission list",
            )
            .with_code(codes::INVALID_PERMISSIONS));
        }
        self.insert(name, key_type, key_type.preset_permissions(), description)
            .await
    }

    async fn insert(
        &self,
        name: &str,
        key_type: ApiKeyType,
        permissions: PermissionSet,
        description: Option<&str>,
    ) -> AppResult<CreatedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("API key name must not be empty"));
        }

        let secret = format!("{SECRET_PREFIX}{}", generate_token());
        let key = self
            .store
            .insert(
                CreateApiKey {
                    key_hash: hash_token(&secret),
                    prefix: secret.chars().take(DISPLAY_PREFIX_LEN).collect(),
                    name: name.to_string(),
                    key_type,
                    permissions,
                    description: description
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                },
                self.clock.now(),
            )
            .await?;

        info!(
            api_key_id = %key.id,
            key_type = %key.key_type,
            permissions = key.permissions.len(),
            "Created API key"
        );
        Ok(CreatedApiKey { key, secret })
    }

    /// Metadata of every key, active and inactive.
    pub async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        self.store.list().await
    }

    /// Deactivates the key with `secret`. `true` if a key matched, even if
    /// it was already inactive.
    pub async fn deactivate_api_key(&self, secret: &str) -> AppResult<bool> {
        let matched = self.store.set_active(&hash_token(secret), false).await?;
        if matched {
            info!(prefix = %display_prefix(secret), "Deactivated API key");
        }
        Ok(matched)
    }

    /// Re-activates the key with `secret`. `true` if a key matched.
    pub async fn activate_api_key(&self, secret: &str) -> AppResult<bool> {
        let matched = self.store.set_active(&hash_token(secret), true).await?;
        if matched {
            info!(prefix = %display_prefix(secret), "Activated API key");
        }
        Ok(matched)
    }

    /// Returns the key iff it exists and is active, recording the use.
    pub async fn authenticate(&self, secret: &str) -> AppResult<Option<ApiKey>> {
        let hash = hash_token(secret);
        let Some(mut key) = self.store.find_by_hash(&hash).await? else {
            warn!(prefix = %display_prefix(secret), "Unknown API key presented");
            return Ok(None);
        };
        if !key.is_active {
            warn!(api_key_id = %key.id, "Inactive API key presented");
            return Ok(None);
        }

        let now = self.clock.now();
        self.store.touch(&hash, now).await?;
        key.last_used_at = Some(now);
        Ok(Some(key))
    }

    /// Totals and histograms over all keys.
    pub async fn get_stats(&self) -> AppResult<ApiKeyStats> {
        let keys = self.store.list().await?;
        let mut stats = ApiKeyStats {
            total: keys.len() as u64,
            ..ApiKeyStats::default()
        };
        for key in &keys {
            if key.is_active {
                stats.active += 1;
            } else {
                stats.inactive += 1;
            }
            *stats.by_type.entry(key.key_type.to_string()).or_default() += 1;
            for permission in key.permissions.iter() {
                *stats
                    .by_permission
                    .entry(permission.to_string())
                    .or_default() += 1;
            }
        }
        Ok(stats)
    }

    /// The permission and key-type vocabularies.
    pub fn permissions_catalog(&self) -> PermissionsCatalog {
        PermissionsCatalog::build()
    }
}

fn display_prefix(secret: &str) -> String {
    secret.chars().take(DISPLAY_PREFIX_LEN).collect()
}
