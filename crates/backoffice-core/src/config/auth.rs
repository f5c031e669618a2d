//! Authentication configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder signing secret. Refused outside development.
pub const PLACEHOLDER_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Longest access token lifetime, in minutes (one day).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;
/// Longest refresh token lifetimes: one year either way.
pub const MAX_SESSION_TTL_MINUTES: u64 = 365 * 24 * 60;
pub const MAX_REMEMBER_ME_TTL_DAYS: u64 = 365;
/// Longest password reset token lifetime, in minutes (one day).
pub const MAX_RESET_TTL_MINUTES: u64 = 24 * 60;
/// Longest email verification token lifetime, in hours (30 days).
pub const MAX_VERIFICATION_TTL_HOURS: u64 = 30 * 24;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in minutes when remember-me is not requested.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
    /// Refresh token TTL in days when remember-me is requested.
    #[serde(default = "default_remember_me_ttl")]
    pub remember_me_ttl_days: u64,
    /// Revoke the presented refresh token and issue a replacement on refresh.
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
    /// Password reset token TTL in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_minutes: u64,
    /// Email verification token TTL in hours.
    #[serde(default = "default_verification_ttl")]
    pub verification_token_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4). Zero disables the strength check.
    #[serde(default)]
    pub password_min_score: u8,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 parallelism.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    /// Login attempts allowed per email within one window.
    #[serde(default = "default_login_attempts")]
    pub login_attempts_per_window: u32,
    /// Login attempt window length in seconds.
    #[serde(default = "default_login_window")]
    pub login_window_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            session_ttl_minutes: default_session_ttl(),
            remember_me_ttl_days: default_remember_me_ttl(),
            rotate_refresh_tokens: false,
            reset_token_ttl_minutes: default_reset_ttl(),
            verification_token_ttl_hours: default_verification_ttl(),
            password_min_length: default_password_min(),
            password_min_score: 0,
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            login_attempts_per_window: default_login_attempts(),
            login_window_seconds: default_login_window(),
        }
    }
}

impl AuthConfig {
    /// Access token lifetime.
    pub fn access_token_ttl(&self) -> Result<TimeDelta, AppError> {
        bounded_ttl(
            "auth.access_token_ttl_minutes",
            self.access_token_ttl_minutes,
            MAX_ACCESS_TTL_MINUTES,
            TimeDelta::try_minutes,
        )
    }

    /// Refresh token lifetime without remember-me.
    pub fn session_ttl(&self) -> Result<TimeDelta, AppError> {
        bounded_ttl(
            "auth.session_ttl_minutes",
            self.session_ttl_minutes,
            MAX_SESSION_TTL_MINUTES,
            TimeDelta::try_minutes,
        )
    }

    /// Refresh token lifetime with remember-me.
    pub fn remember_me_ttl(&self) -> Result<TimeDelta, AppError> {
        bounded_ttl(
            "auth.remember_me_ttl_days",
            self.remember_me_ttl_days,
            MAX_REMEMBER_ME_TTL_DAYS,
            TimeDelta::try_days,
        )
    }

    /// Password reset token lifetime.
    pub fn reset_token_ttl(&self) -> Result<TimeDelta, AppError> {
        bounded_ttl(
            "auth.reset_token_ttl_minutes",
            self.reset_token_ttl_minutes,
            MAX_RESET_TTL_MINUTES,
            TimeDelta::try_minutes,
        )
    }

    /// Email verification token lifetime.
    pub fn verification_token_ttl(&self) -> Result<TimeDelta, AppError> {
        bounded_ttl(
            "auth.verification_token_ttl_hours",
            self.verification_token_ttl_hours,
            MAX_VERIFICATION_TTL_HOURS,
            TimeDelta::try_hours,
        )
    }

    /// Checks every lifetime setting.
    pub fn validate_lifetimes(&self) -> Result<(), AppError> {
        self.access_token_ttl()?;
        self.session_ttl()?;
        self.remember_me_ttl()?;
        self.reset_token_ttl()?;
        self.verification_token_ttl()?;
        Ok(())
    }
}

/// A lifetime in `1..=max` units, converted without overflow.
fn bounded_ttl(
    field: &str,
    value: u64,
    max: u64,
    to_delta: fn(i64) -> Option<TimeDelta>,
) -> Result<TimeDelta, AppError> {
    if value == 0 || value > max {
        return Err(AppError::configuration(format!(
            "{field} must be between 1 and {max}, got {value}"
        )));
    }
    i64::try_from(value)
        .ok()
        .and_then(to_delta)
        .ok_or_else(|| AppError::configuration(format!("{field} is out of range")))
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_session_ttl() -> u64 {
    15
}

fn default_remember_me_ttl() -> u64 {
    7
}

fn default_reset_ttl() -> u64 {
    60
}

fn default_verification_ttl() -> u64 {
    48
}

fn default_password_min() -> usize {
    8
}

fn default_argon2_memory() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_login_attempts() -> u32 {
    10
}

fn default_login_window() -> u64 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl().unwrap(), TimeDelta::minutes(15));
        assert_eq!(config.session_ttl().unwrap(), TimeDelta::minutes(15));
        assert_eq!(config.remember_me_ttl().unwrap(), TimeDelta::days(7));
        assert_eq!(config.reset_token_ttl().unwrap(), TimeDelta::hours(1));
        assert_eq!(config.verification_token_ttl().unwrap(), TimeDelta::hours(48));
    }

    #[test]
    fn test_oversized_lifetimes_rejected_without_panicking() {
        let config = AuthConfig {
            remember_me_ttl_days: 200_000_000_000,
            access_token_ttl_minutes: u64::MAX,
            ..AuthConfig::default()
        };
        assert!(config.remember_me_ttl().is_err());
        assert!(config.access_token_ttl().is_err());
        assert!(config.validate_lifetimes().is_err());
    }

    #[test]
    fn test_lifetime_upper_bound_is_inclusive() {
        let config = AuthConfig {
            remember_me_ttl_days: MAX_REMEMBER_ME_TTL_DAYS,
            access_token_ttl_minutes: MAX_ACCESS_TTL_MINUTES + 1,
            ..AuthConfig::default()
        };
        assert_eq!(config.remember_me_ttl().unwrap(), TimeDelta::days(365));
        assert!(config.access_token_ttl().is_err());
    }
}
