//! Store set selected by configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use backoffice_core::config::AppConfig;
use backoffice_core::config::auth::AuthConfig;
use backoffice_core::config::database::StoreBackend;
use backoffice_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::{
    MemoryApiKeyStore, MemoryOneTimeTokenStore, MemoryRefreshTokenStore, MemoryUserStore,
};
use crate::migration::run_migrations;
use crate::postgres::{PgApiKeyStore, PgOneTimeTokenStore, PgRefreshTokenStore, PgUserStore};
use crate::store::{ApiKeyStore, OneTimeTokenStore, RefreshTokenStore, UserStore};

/// Every store the auth core needs, behind shared trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Credential store.
    pub users: Arc<dyn UserStore>,
    /// Refresh token records.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    /// Password-reset and email-verification tokens.
    pub one_time_tokens: Arc<dyn OneTimeTokenStore>,
    /// API key records.
    pub api_keys: Arc<dyn ApiKeyStore>,
    /// Connection pool when backed by PostgreSQL.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Build the stores for the configured backend, running migrations on
    /// PostgreSQL when enabled.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        match config.database.backend {
            StoreBackend::Memory => {
                info!("Using in-memory stores; state is lost on restart");
                Ok(Self::in_memory(&config.auth))
            }
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                if config.database.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Process-local stores.
    pub fn in_memory(auth: &AuthConfig) -> Self {
        let longest_one_time = Duration::from_secs(
            (auth.reset_token_ttl_minutes * 60).max(auth.verification_token_ttl_hours * 3600),
        );
        Self {
            users: Arc::new(MemoryUserStore::new()),
            refresh_tokens: Arc::new(MemoryRefreshTokenStore::new()),
            one_time_tokens: Arc::new(MemoryOneTimeTokenStore::new(longest_one_time)),
            api_keys: Arc::new(MemoryApiKeyStore::new()),
            pool: None,
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(PgUserStore::new(pg.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenStore::new(pg.clone())),
            one_time_tokens: Arc::new(PgOneTimeTokenStore::new(pg.clone())),
            api_keys: Arc::new(PgApiKeyStore::new(pg)),
            pool: Some(pool),
        }
    }

    /// Check backend connectivity. Memory stores are always healthy.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }
}
