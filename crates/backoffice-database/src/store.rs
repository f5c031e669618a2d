//! Store traits shared by the in-memory and PostgreSQL backends.
//!
//! Every timestamp is supplied by the caller so that expiry decisions
//! follow the injected clock rather than the database server's.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use backoffice_core::AppResult;
use backoffice_entity::api_key::{ApiKey, CreateApiKey};
use backoffice_entity::token::{OneTimeToken, RefreshToken, TokenPurpose};
use backoffice_entity::user::{CreateUser, User};

/// Credential store for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Insert a new user. Fails with `EMAIL_IN_USE` if the normalized email
    /// already exists.
    async fn create(&self, input: CreateUser, now: DateTime<Utc>) -> AppResult<User>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (normalized before lookup).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Replace the password hash. Returns `false` if the user does not exist.
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Mark the email address verified. Returns `false` if the user does not exist.
    async fn mark_email_verified(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Record a successful login.
    async fn record_login(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()>;

    /// Number of stored users.
    async fn count(&self) -> AppResult<u64>;
}

/// Stateful refresh token records.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + Debug {
    /// Persist a freshly issued token.
    async fn insert(&self, token: RefreshToken) -> AppResult<()>;

    /// Look up a token by the hash of its opaque value.
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Record that the token minted an access token.
    async fn touch(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<()>;

    /// Revoke one live token. Returns `true` if a live token was revoked.
    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke every live token of a user. Returns the number revoked.
    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;

    /// Delete expired and revoked records. Returns the number deleted.
    async fn purge(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Single-use tokens (password reset, email verification).
#[async_trait]
pub trait OneTimeTokenStore: Send + Sync + Debug {
    /// Persist a token.
    async fn insert(&self, token: OneTimeToken) -> AppResult<()>;

    /// Atomically remove and return the token with the given hash and purpose.
    async fn take(&self, token_hash: &str, purpose: TokenPurpose)
    -> AppResult<Option<OneTimeToken>>;

    /// Delete expired tokens. Returns the number deleted.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// API key records.
#[async_trait]
pub trait ApiKeyStore: Send + Sync + Debug {
    /// Insert a new key.
    async fn insert(&self, input: CreateApiKey, now: DateTime<Utc>) -> AppResult<ApiKey>;

    /// Look up a key by the hash of its secret.
    async fn find_by_hash(&self, key_hash: &str) -> AppResult<Option<ApiKey>>;

    /// Every key, newest first.
    async fn list(&self) -> AppResult<Vec<ApiKey>>;

    /// Set the active flag. Returns `true` if a key matched, whatever its
    /// previous state.
    async fn set_active(&self, key_hash: &str, active: bool) -> AppResult<bool>;

    /// Record a successful authentication.
    async fn touch(&self, key_hash: &str, now: DateTime<Utc>) -> AppResult<()>;

    /// Number of stored keys.
    async fn count(&self) -> AppResult<u64>;
}
