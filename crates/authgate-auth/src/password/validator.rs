//! Registration input validation.

use authgate_core::config::AuthConfig;
use authgate_core::error::AppError;

/// Validates usernames and passwords submitted for registration.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    /// Maximum username length in characters.
    username_max: usize,
    /// Minimum password length in characters.
    password_min: usize,
    /// Maximum password length in characters.
    password_max: usize,
}

impl CredentialValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username_max: config.username_max_length,
            password_min: config.password_min_length.max(1),
            password_max: config.password_max_length,
        }
    }

    /// Validates a registration request.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, username: &str, password: &str) -> Result<(), AppError> {
        self.validate_username(username)?;
        self.validate_password(password)
    }

    fn validate_username(&self, username: &str) -> Result<(), AppError> {
        if username.trim().is_empty() {
            return Err(AppError::validation("Username is required"));
        }

        if username.chars().count() > self.username_max {
            return Err(AppError::validation(format!(
                "Username must be at most {} characters long",
                self.username_max
            )));
        }

        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(AppError::validation(
                "Username may only contain letters, digits, '_', '-' and '.'",
            ));
        }

        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), AppError> {
        if password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        let len = password.chars().count();
        if len < self.password_min {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.password_min
            )));
        }
        if len > self.password_max {
            return Err(AppError::validation(format!(
                "Password must be at most {} characters long",
                self.password_max
            )));
        }

        Ok(())
    }
}

impl Default for CredentialValidator {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_core::error::ErrorKind;

    #[test]
    fn test_accepts_typical_input() {
        let v = CredentialValidator::default();
        assert!(v.validate("alice", "secret1").is_ok());
        assert!(v.validate("first.last-2_x", "longer password").is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let v = CredentialValidator::default();
        let err = v.validate("", "secret1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Username is required");
        let err = v.validate("   ", "secret1").unwrap_err();
        assert_eq!(err.message, "Username is required");
        let err = v.validate("alice", "").unwrap_err();
        assert_eq!(err.message, "Password is required");
    }

    #[test]
    fn test_length_limits() {
        let v = CredentialValidator::default();
        assert!(v.validate("alice", "short").is_err());
        assert!(v.validate(&"a".repeat(65), "secret1").is_err());
        assert!(v.validate("alice", &"p".repeat(257)).is_err());
    }

    #[test]
    fn test_rejects_odd_characters_in_username() {
        let v = CredentialValidator::default();
        assert!(v.validate("alice smith", "secret1").is_err());
        assert!(v.validate("alice;drop", "secret1").is_err());
    }
}
