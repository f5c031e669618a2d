//! In-memory API key store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use backoffice_core::AppResult;
use backoffice_entity::api_key::{ApiKey, CreateApiKey};

use crate::store::ApiKeyStore;

/// API keys keyed by the hash of their secret.
#[derive(Debug, Default)]
pub struct MemoryApiKeyStore {
    keys: DashMap<String, ApiKey>,
}

impl MemoryApiKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyStore for MemoryApiKeyStore {
    async fn insert(&self, input: CreateApiKey, now: DateTime<Utc>) -> AppResult<ApiKey> {
        let key = ApiKey {
            id: Uuid::now_v7(),
            key_hash: input.key_hash,
            prefix: input.prefix,
            name: input.name,
            key_type: input.key_type,
            permissions: input.permissions,
            description: input.description,
            is_active: true,
            created_at: now,
            last_used_at: None,
        };
        self.keys.insert(key.key_hash.clone(), key.clone());
        Ok(key)
    }

    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        Ok(self.keys.get(key_hash).map(|k| k.value().clone()))
    }

    async fn list(&self) -> AppResult<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self.keys.iter().map(|k| k.value().clone()).collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(keys)
    }

    async fn set_active(&self, key_hash: &str, active: bool) -> AppResult<bool> {
        Ok(match self.keys.get_mut(key_hash) {
            Some(mut key) => {
                key.is_active = active;
                true
            }
            None => false,
        })
    }

    async fn touch(&self, key_hash: &str, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(mut key) = self.keys.get_mut(key_hash) {
            key.last_used_at = Some(now);
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.keys.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_entity::api_key::ApiKeyType;

    #[tokio::test]
    async fn test_set_active_is_idempotent() {
        let store = MemoryApiKeyStore::new();
        store
            .insert(
                CreateApiKey {
                    key_hash: "h".into(),
                    prefix: "bo_abcd".into(),
                    name: "ci".into(),
                    key_type: ApiKeyType::ReadOnly,
                    permissions: ApiKeyType::ReadOnly.preset_permissions(),
                    description: None,
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(store.set_active("h", false).await.unwrap());
        assert!(store.set_active("h", false).await.unwrap());
        assert!(!store.set_active("missing", false).await.unwrap());
        assert!(!store.find_by_hash("h").await.unwrap().unwrap().is_active);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_touch_by_hash_records_last_use() {
        let store = MemoryApiKeyStore::new();
        let created = Utc::now();
        for hash in ["h1", "h2"] {
            store
                .insert(
                    CreateApiKey {
                        key_hash: hash.into(),
                        prefix: "bo_abcd".into(),
                        name: hash.into(),
                        key_type: ApiKeyType::Service,
                        permissions: ApiKeyType::Service.preset_permissions(),
                        description: None,
                    },
                    created,
                )
                .await
                .unwrap();
        }

        let used = created + chrono::Duration::minutes(3);
        store.touch("h2", used).await.unwrap();
        store.touch("missing", used).await.unwrap();

        assert!(store.find_by_hash("h1").await.unwrap().unwrap().last_used_at.is_none());
        assert_eq!(
            store.find_by_hash("h2").await.unwrap().unwrap().last_used_at,
            Some(used)
        );
    }
}
