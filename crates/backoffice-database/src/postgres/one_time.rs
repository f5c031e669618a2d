//! PostgreSQL one-time token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use backoffice_core::error::{AppError, ErrorKind};
use backoffice_core::result::AppResult;
use backoffice_entity::token::{OneTimeToken, TokenPurpose};

use crate::store::OneTimeTokenStore;

/// Repository for password-reset and email-verification tokens.
#[derive(Debug, Clone)]
pub struct PgOneTimeTokenStore {
    pool: PgPool,
}

impl PgOneTimeTokenStore {
    /// Create a new one-time token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OneTimeTokenStore for PgOneTimeTokenStore {
    async fn insert(&self, token: OneTimeToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO one_time_tokens (token_hash, user_id, purpose, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&token.token_hash)
        .bind(token.user_id)
        .bind(token.purpose)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store one-time token", e)
        })?;
        Ok(())
    }

    async fn take(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> AppResult<Option<OneTimeToken>> {
        sqlx::query_as::<_, OneTimeToken>(
            "DELETE FROM one_time_tokens WHERE token_hash = $1 AND purpose = $2 RETURNING *",
        )
        .bind(token_hash)
        .bind(purpose)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume one-time token", e)
        })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM one_time_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge one-time tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
