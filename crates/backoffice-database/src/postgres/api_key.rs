//! PostgreSQL API key store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use backoffice_core::error::{AppError, ErrorKind};
use backoffice_core::result::AppResult;
use backoffice_entity::api_key::{ApiKey, ApiKeyType, CreateApiKey};

use super::decode_permissions;
use crate::store::ApiKeyStore;

#[derive(Debug, FromRow)]
struct ApiKeyRow {
    id: Uuid,
    key_hash: String,
    prefix: String,
    name: String,
    key_type: ApiKeyType,
    permissions: Vec<String>,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
}

impl TryFrom<ApiKeyRow> for ApiKey {
    type Error = AppError;

    fn try_from(row: ApiKeyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            permissions: decode_permissions(&row.permissions)?,
            id: row.id,
            key_hash: row.key_hash,
            prefix: row.prefix,
            name: row.name,
            key_type: row.key_type,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            last_used_at: row.last_used_at,
        })
    }
}

/// Repository for API key records.
#[derive(Debug, Clone)]
pub struct PgApiKeyStore {
    pool: PgPool,
}

impl PgApiKeyStore {
    /// Create a new API key repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyStore for PgApiKeyStore {
    async fn insert(&self, input: CreateApiKey, now: DateTime<Utc>) -> AppResult<ApiKey> {
        let row = sqlx::query_as::<_, ApiKeyRow>(
            "INSERT INTO api_keys (id, key_hash, prefix, name, key_type, permissions, \
             description, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&input.key_hash)
        .bind(&input.prefix)
        .bind(&input.name)
        .bind(input.key_type)
        .bind(input.permissions.to_strings())
        .bind(&input.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create API key", e))?;
        ApiKey::try_from(row)
    }

    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys WHERE key_hash = $1")
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find API key", e))?
            .map(ApiKey::try_from)
            .transpose()
    }

    async fn list(&self) -> AppResult<Vec<ApiKey>> {
        sqlx::query_as::<_, ApiKeyRow>("SELECT * FROM api_keys ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list API keys", e))?
            .into_iter()
            .map(ApiKey::try_from)
            .collect()
    }

    async fn set_active(&self, key_hash: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE api_keys SET is_active = $2 WHERE key_hash = $1")
            .bind(key_hash)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to toggle API key", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch(&self, key_hash: &str, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE api_keys SET last_used_at = $2 WHERE key_hash = $1")
            .bind(key_hash)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch API key", e))?;
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count API keys", e))?;
        Ok(count as u64)
    }
}
