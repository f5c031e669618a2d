//! In-memory refresh token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use backoffice_core::AppResult;
use backoffice_entity::token::RefreshToken;

use crate::store::RefreshTokenStore;

/// Refresh tokens keyed by the hash of their opaque value.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    tokens: DashMap<String, RefreshToken>,
}

impl MemoryRefreshTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, live or not.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, token: RefreshToken) -> AppResult<()> {
        self.tokens.insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.tokens.get(token_hash).map(|t| t.value().clone()))
    }

    async fn touch(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(mut entry) = self.tokens.get_mut(token_hash) {
            entry.last_used_at = Some(now);
        }
        Ok(())
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        Ok(match self.tokens.get_mut(token_hash) {
            Some(mut token) if token.is_live(now) => {
                token.revoked_at = Some(now);
                true
            }
            _ => false,
        })
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let mut revoked = 0;
        for mut token in self.tokens.iter_mut() {
            if token.user_id == user_id && token.is_live(now) {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn purge(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_purgeable(now));
        Ok(before.saturating_sub(self.tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(hash: &str, user_id: Uuid, expires_at: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash.to_string(),
            user_id,
            issued_at: Utc::now(),
            expires_at,
            user_agent: None,
            ip_address: None,
            remember_me: false,
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_revoke_all_counts_only_live_tokens() {
        let store = MemoryRefreshTokenStore::new();
        let now = Utc::now();
        let user = Uuid::new_v4();
        store.insert(token("a", user, now + Duration::hours(1))).await.unwrap();
        store.insert(token("b", user, now + Duration::hours(1))).await.unwrap();
        store.insert(token("c", user, now - Duration::hours(1))).await.unwrap();
        store
            .insert(token("d", Uuid::new_v4(), now + Duration::hours(1)))
            .await
            .unwrap();

        assert_eq!(store.revoke_all_for_user(user, now).await.unwrap(), 2);
        assert_eq!(store.revoke_all_for_user(user, now).await.unwrap(), 0);
        let other = store.find_by_hash("d").await.unwrap().unwrap();
        assert!(other.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_purge_removes_expired_and_revoked() {
        let store = MemoryRefreshTokenStore::new();
        let now = Utc::now();
        let user = Uuid::new_v4();
        store.insert(token("live", user, now + Duration::hours(1))).await.unwrap();
        store.insert(token("old", user, now - Duration::seconds(1))).await.unwrap();
        store.insert(token("gone", user, now + Duration::hours(1))).await.unwrap();
        assert!(store.revoke("gone", now).await.unwrap());
        assert!(!store.revoke("gone", now).await.unwrap());

        assert_eq!(store.purge(now).await.unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_touch_updates_only_the_matching_token() {
        let store = MemoryRefreshTokenStore::new();
        let now = Utc::now();
        let user = Uuid::new_v4();
        store.insert(token("a", user, now + Duration::hours(1))).await.unwrap();
        store.insert(token("b", user, now + Duration::hours(1))).await.unwrap();

        store.touch("a", now).await.unwrap();
        store.touch("missing", now).await.unwrap();

        let touched = store.find_by_hash("a").await.unwrap().unwrap();
        let other = store.find_by_hash("b").await.unwrap().unwrap();
        assert_eq!(touched.last_used_at, Some(now));
        assert!(other.last_used_at.is_none());
    }
}
