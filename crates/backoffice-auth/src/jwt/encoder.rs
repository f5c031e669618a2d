//! HS256 access token signing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use backoffice_core::config::auth::AuthConfig;
use backoffice_core::error::AppError;

use super::claims::{AccessClaims, AccessTokenSubject};

/// A signed access token and its lifetime.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedAccessToken {
    /// The compact JWT.
    pub token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Creates signed access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration. Fails on an
    /// out-of-range access token lifetime.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: config.access_token_ttl()?,
        })
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Signs an access token for `subject`, issued at `now`.
    pub fn encode_access_token(
        &self,
        subject: &AccessTokenSubject,
        now: DateTime<Utc>,
    ) -> Result<IssuedAccessToken, AppError> {
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            sub: subject.user_id,
            email: subject.email.clone(),
            role: subject.role,
            permissions: subject.permissions.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign access token: {e}")))?;

        Ok(IssuedAccessToken {
            token,
            expires_at,
            expires_in: self.access_ttl.num_seconds(),
        })
    }
}
