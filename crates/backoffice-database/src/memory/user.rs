//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use backoffice_core::error::codes;
use backoffice_core::{AppError, AppResult};
use backoffice_entity::user::{CreateUser, User, normalize_email};

use crate::store::UserStore;

#[derive(Debug, Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
}

/// Users held in a lock-protected map with a unique email index.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, input: CreateUser, now: DateTime<Utc>) -> AppResult<User> {
        let email = normalize_email(&input.email);
        let mut table = self.table.write().await;
        if table.by_email.contains_key(&email) {
            return Err(AppError::conflict("Email address is already registered")
                .with_code(codes::EMAIL_IN_USE));
        }

        let user = User {
            id: Uuid::now_v7(),
            email: email.clone(),
            password_hash: input.password_hash,
            name: input.name,
            role: input.role,
            permissions: input.permissions,
            is_active: true,
            email_verified: input.email_verified,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        table.by_email.insert(email, user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.table.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut table = self.table.write().await;
        Ok(match table.by_id.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = now;
                true
            }
            None => false,
        })
    }

    async fn mark_email_verified(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut table = self.table.write().await;
        Ok(match table.by_id.get_mut(&id) {
            Some(user) => {
                user.email_verified = true;
                user.updated_at = now;
                true
            }
            None => false,
        })
    }

    async fn record_login(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.table.write().await.by_id.get_mut(&id) {
            user.last_login_at = Some(now);
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.table.read().await.by_id.len() as u64)
    }
}
