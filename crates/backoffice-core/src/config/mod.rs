//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty file
//! yields a working development setup.

pub mod app;
pub mod auth;
pub mod cleanup;
pub mod database;
pub mod logging;
pub mod rate_limit;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::{AuthConfig, PLACEHOLDER_JWT_SECRET};
use self::cleanup::CleanupConfig;
use self::database::{DatabaseConfig, StoreBackend};
use self::logging::LoggingConfig;
use self::rate_limit::RateLimitConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Request rate limiting settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Background cleanup settings.
    #[serde(default)]
    pub cleanup: CleanupConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `BACKOFFICE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BACKOFFICE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Whether the server runs in development mode.
    ///
    /// Development mode exposes password-reset and email-verification
    /// tokens in HTTP responses.
    pub fn is_development(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("development")
    }

    /// Reject configurations that cannot run safely.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if !self.is_development() && self.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
            return Err(AppError::configuration(
                "auth.jwt_secret must be changed outside development",
            ));
        }
        self.auth.validate_lifetimes()?;
        if self.auth.password_min_score > 4 {
            return Err(AppError::configuration(
                "auth.password_min_score must be between 0 and 4",
            ));
        }
        if self.rate_limit.enabled
            && (self.rate_limit.max_requests == 0 || self.rate_limit.window_seconds == 0)
        {
            return Err(AppError::configuration(
                "rate_limit.max_requests and rate_limit.window_seconds must be positive",
            ));
        }
        if self.auth.login_window_seconds == 0 {
            return Err(AppError::configuration(
                "auth.login_window_seconds must be positive",
            ));
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_in_development() {
        let config = AppConfig::default();
        assert!(config.is_development());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholder_secret_refused_in_production() {
        let mut config = AppConfig::default();
        config.server.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.auth.jwt_secret = "a-real-secret-from-the-vault".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = AppConfig::default();
        config.auth.session_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut config = AppConfig::default();
        config.auth.remember_me_ttl_days = 200_000_000_000;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let mut config = AppConfig::default();
        config.database.backend = StoreBackend::Postgres;
        assert!(config.validate().is_err());
        config.database.url = "postgres://localhost/backoffice".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_match_session_lifetimes() {
        let config = AppConfig::default();
        assert_eq!(config.auth.access_token_ttl_minutes, 15);
        assert_eq!(config.auth.session_ttl_minutes, 15);
        assert_eq!(config.auth.remember_me_ttl_days, 7);
        assert!(!config.auth.rotate_refresh_tokens);
    }
}
