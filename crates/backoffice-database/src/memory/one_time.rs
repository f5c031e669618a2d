//! In-memory one-time token store backed by moka.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;

use backoffice_core::AppResult;
use backoffice_entity::token::{OneTimeToken, TokenPurpose};

use crate::store::OneTimeTokenStore;

/// One-time tokens keyed by purpose and hash.
///
/// The cache-level TTL is an upper bound on retention; the logical expiry
/// is the record's `expires_at`, checked by the caller against its clock.
#[derive(Debug, Clone)]
pub struct MemoryOneTimeTokenStore {
    cache: Cache<String, OneTimeToken>,
}

impl MemoryOneTimeTokenStore {
    /// Create a store that forgets entries after `max_lifetime`.
    pub fn new(max_lifetime: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(max_lifetime)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl OneTimeTokenStore for MemoryOneTimeTokenStore {
    async fn insert(&self, token: OneTimeToken) -> AppResult<()> {
        self.cache
            .insert(cache_key(&token.token_hash, token.purpose), token)
            .await;
        Ok(())
    }

    async fn take(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> AppResult<Option<OneTimeToken>> {
        Ok(self.cache.remove(&cache_key(token_hash, purpose)).await)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let expired: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, token)| token.is_expired(now))
            .map(|(key, _)| key.as_ref().clone())
            .collect();
        for key in &expired {
            self.cache.invalidate(key).await;
        }
        self.cache.run_pending_tasks().await;
        Ok(expired.len() as u64)
    }
}

fn cache_key(token_hash: &str, purpose: TokenPurpose) -> String {
    format!("{purpose}:{token_hash}")
}
