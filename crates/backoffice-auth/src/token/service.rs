//! Token service: stateless access tokens and stored refresh tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use backoffice_core::clock::SharedClock;
use backoffice_core::config::auth::AuthConfig;
use backoffice_core::result::AppResult;
use backoffice_database::store::{RefreshTokenStore, UserStore};
use backoffice_entity::token::{ClientMetadata, RefreshToken};
use backoffice_entity::user::User;

use crate::jwt::{
    AccessClaims, AccessTokenSubject, IssuedAccessToken, JwtDecoder, JwtEncoder, TokenRejection,
};
use crate::secret::{generate_token, hash_token};

/// A freshly minted refresh token. The value is shown to the client once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedRefreshToken {
    /// Opaque token value.
    pub token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Whether the remember-me lifetime applies.
    pub remember_me: bool,
}

/// Result of presenting a live refresh token.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// New access token carrying the user's current claims.
    pub access: IssuedAccessToken,
    /// Replacement refresh token when rotation is enabled.
    pub rotated: Option<IssuedRefreshToken>,
    /// The user the token belongs to.
    pub user: User,
}

/// Mints and validates access tokens; issues, refreshes, and revokes
/// refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    clock: SharedClock,
    session_ttl: Duration,
    remember_me_ttl: Duration,
    rotate: bool,
}

impl TokenService {
    /// Creates a token service.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        clock: SharedClock,
    ) -> AppResult<Self> {
        Ok(Self {
            encoder: JwtEncoder::new(config)?,
            decoder: JwtDecoder::new(config, clock.clone()),
            users,
            refresh_tokens,
            clock,
            session_ttl: config.session_ttl()?,
            remember_me_ttl: config.remember_me_ttl()?,
            rotate: config.rotate_refresh_tokens,
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.encoder.access_ttl().num_seconds()
    }

    /// Refresh token lifetime for the given remember-me choice.
    pub fn refresh_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.remember_me_ttl
        } else {
            self.session_ttl
        }
    }

    /// Signs an access token for `subject`.
    pub fn issue_access_token(&self, subject: &AccessTokenSubject) -> AppResult<IssuedAccessToken> {
        self.encoder.encode_access_token(subject, self.clock.now())
    }

    /// Issues and stores a refresh token. Other tokens of the user are
    /// left untouched.
    pub async fn issue_refresh_token(
        &self,
        user_id: Uuid,
        client: &ClientMetadata,
        remember_me: bool,
    ) -> AppResult<IssuedRefreshToken> {
        let now = self.clock.now();
        let ttl = self.refresh_ttl(remember_me);
        let value = generate_token();

        let record = RefreshToken {
            id: Uuid::now_v7(),
            token_hash: hash_token(&value),
            user_id,
            issued_at: now,
            expires_at: now + ttl,
            user_agent: client.user_agent.clone(),
            ip_address: client.ip_address.clone(),
            remember_me,
            last_used_at: None,
            revoked_at: None,
        };
        let expires_at = record.expires_at;
        self.refresh_tokens.insert(record).await?;

        debug!(user_id = %user_id, remember_me, "Issued refresh token");
        Ok(IssuedRefreshToken {
            token: value,
            expires_at,
            expires_in: ttl.num_seconds(),
            remember_me,
        })
    }

    /// Validates an access token against the signing secret and the clock.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenRejection> {
        self.decoder.decode_access_token(token)
    }

    /// Mints a new access token from a live refresh token.
    ///
    /// Returns `None` when the token is unknown, revoked, or expired, or when
    /// its user is gone or inactive. Claims are re-read from the credential
    /// store so role and permission changes take effect on refresh.
    pub async fn refresh_access_token(&self, value: &str) -> AppResult<Option<RefreshOutcome>> {
        let now = self.clock.now();
        let hash = hash_token(value);

        let Some(record) = self.refresh_tokens.find_by_hash(&hash).await? else {
            return Ok(None);
        };
        if !record.is_live(now) {
            debug!(user_id = %record.user_id, "Refresh token is revoked or expired");
            return Ok(None);
        }

        let user = match self.users.find_by_id(record.user_id).await? {
            Some(user) if user.is_active => user,
            _ => {
                debug!(user_id = %record.user_id, "Refresh token owner is gone or inactive");
                return Ok(None);
            }
        };

        let rotated = if self.rotate {
            if !self.refresh_tokens.revoke(&hash, now).await? {
                return Ok(None);
            }
            let client = ClientMetadata {
                user_agent: record.user_agent.clone(),
                ip_address: record.ip_address.clone(),
            };
            Some(
                self.issue_refresh_token(user.id, &client, record.remember_me)
                    .await?,
            )
        } else {
            self.refresh_tokens.touch(&hash, now).await?;
            None
        };

        let access = self.issue_access_token(&AccessTokenSubject::from(&user))?;
        Ok(Some(RefreshOutcome {
            access,
            rotated,
            user,
        }))
    }

    /// Revokes every live refresh token of a user. Returns the count.
    pub async fn revoke_all_user_tokens(&self, user_id: Uuid) -> AppResult<u64> {
        let count = self
            .refresh_tokens
            .revoke_all_for_user(user_id, self.clock.now())
            .await?;
        info!(user_id = %user_id, count, "Revoked refresh tokens");
        Ok(count)
    }

    /// Revokes a single refresh token by value.
    pub async fn revoke_refresh_token(&self, value: &str) -> AppResult<bool> {
        self.refresh_tokens
            .revoke(&hash_token(value), self.clock.now())
            .await
    }

    /// Deletes expired and revoked refresh token records.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        self.refresh_tokens.purge(self.clock.now()).await
    }
}
