//! Password policy enforcement for new passwords.

use backoffice_core::config::auth::AuthConfig;
use backoffice_core::error::{AppError, codes};

/// Upper bound on accepted password length, in characters.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns the first violation as a `WEAK_PASSWORD` error.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(weak(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(weak(format!(
                "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
            )));
        }

        if self.min_score > 0 {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            let score = match estimate.score() {
                zxcvbn::Score::Zero => 0,
                zxcvbn::Score::One => 1,
                zxcvbn::Score::Two => 2,
                zxcvbn::Score::Three => 3,
                _ => 4,
            };
            if score < self.min_score {
                return Err(weak(
                    "Password is too easy to guess. Use a longer or less common password.",
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(weak(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

fn weak(message: impl Into<String>) -> AppError {
    AppError::validation(message).with_code(codes::WEAK_PASSWORD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate("secret123").is_ok());
        let err = validator.validate("short").unwrap_err();
        assert_eq!(err.code, codes::WEAK_PASSWORD);
        assert!(validator.validate(&"a".repeat(129)).is_err());
        assert!(validator.validate(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_strength_floor_when_enabled() {
        let config = AuthConfig {
            password_min_score: 3,
            ..AuthConfig::default()
        };
        let validator = PasswordValidator::new(&config);
        assert!(validator.validate("password").is_err());
        assert!(validator.validate("correct horse battery staple 91!").is_ok());
    }

    #[test]
    fn test_not_same() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate_not_same("a", "a").is_err());
        assert!(validator.validate_not_same("a", "b").is_ok());
    }
}
