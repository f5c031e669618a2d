//! Unified application error types.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. Every error carries a
//! machine-readable `code` that is surfaced verbatim to HTTP clients.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed (invalid credentials, expired token, etc.).
    Authentication,
    /// The caller is authenticated but lacks a required permission.
    Authorization,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, reused single-use token, etc.).
    Conflict,
    /// A rate limit was exceeded.
    RateLimit,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl ErrorKind {
    /// Machine-readable code used when no more specific code was attached.
    pub fn default_code(&self) -> &'static str {
        match self {
            Self::NotFound => codes::NOT_FOUND,
            Self::Authentication => codes::NOT_AUTHENTICATED,
            Self::Authorization => codes::INSUFFICIENT_PERMISSIONS,
            Self::Validation => codes::VALIDATION_ERROR,
            Self::Conflict => codes::CONFLICT,
            Self::RateLimit => codes::RATE_LIMITED,
            Self::Internal | Self::Database | Self::Configuration | Self::Serialization => {
                codes::INTERNAL_ERROR
            }
        }
    }

    /// Whether this kind denotes an infrastructure fault rather than a
    /// caller-fixable condition.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Internal | Self::Database | Self::Configuration | Self::Serialization
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// Machine-readable error codes surfaced to clients.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const NOT_AUTHENTICATED: &str = "NOT_AUTHENTICATED";
    pub const INSUFFICIENT_PERMISSIONS: &str = "INSUFFICIENT_PERMISSIONS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const ACCOUNT_DISABLED: &str = "ACCOUNT_DISABLED";
    pub const TOO_MANY_ATTEMPTS: &str = "TOO_MANY_ATTEMPTS";
    pub const EMAIL_IN_USE: &str = "EMAIL_IN_USE";
    pub const ROLE_NOT_ALLOWED: &str = "ROLE_NOT_ALLOWED";
    pub const WEAK_PASSWORD: &str = "WEAK_PASSWORD";
    pub const INVALID_REFRESH_TOKEN: &str = "INVALID_REFRESH_TOKEN";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const WRONG_PASSWORD: &str = "WRONG_PASSWORD";

    pub const INVALID_PERMISSIONS: &str = "INVALID_PERMISSIONS";
    pub const API_KEY_NOT_FOUND: &str = "API_KEY_NOT_FOUND";
}

/// The unified application error.
///
/// Carries the error category, a machine-readable code, a human-readable
/// message, optional structured details, and an optional underlying cause.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// Machine-readable code (e.g. `EMAIL_IN_USE`).
    pub code: &'static str,
    /// A human-readable error message.
    pub message: String,
    /// Optional structured details for the client.
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error with the kind's default code.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    /// Replace the machine-readable code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a rate-limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// The generic "not authenticated" rejection used by guarded routes.
    pub fn not_authenticated() -> Self {
        Self::authentication("Authentication required")
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            code: self.code,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codes_follow_kind() {
        assert_eq!(AppError::not_authenticated().code, codes::NOT_AUTHENTICATED);
        assert_eq!(AppError::validation("x").code, codes::VALIDATION_ERROR);
        assert_eq!(AppError::database("x").code, codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_with_code_overrides_default() {
        let err = AppError::conflict("taken").with_code(codes::EMAIL_IN_USE);
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.code, "EMAIL_IN_USE");
    }

    #[test]
    fn test_clone_drops_source_keeps_details() {
        let err = AppError::with_source(
            ErrorKind::Database,
            "boom",
            std::io::Error::other("disk"),
        )
        .with_details(serde_json::json!({"table": "users"}));
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.details, err.details);
    }

    #[test]
    fn test_infrastructure_classification() {
        assert!(ErrorKind::Database.is_infrastructure());
        assert!(!ErrorKind::Authentication.is_infrastructure());
    }
}
