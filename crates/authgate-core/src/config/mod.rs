//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files and `AUTHGATE__`-prefixed environment variables. Every field
//! carries a default, so an empty configuration is valid.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::{AuthConfig, CredentialBackend};
pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::session::{SameSite, SessionBackend, SessionConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential and hashing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifecycle and cookie settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Cache provider settings (backs the `cache` session store).
    #[serde(default)]
    pub cache: CacheConfig,
    /// Database settings (backs the `postgres` credential store).
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default`, the environment overlay `config/{env}`, and
    /// environment variables such as `AUTHGATE__SESSION__TTL_MINUTES`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AUTHGATE")
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

    /// Reject settings that would make the service unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(auth::MIN_HASH_COST..=auth::MAX_HASH_COST).contains(&self.auth.hash_cost) {
            return Err(AppError::configuration(format!(
                "auth.hash_cost must be between {} and {}",
                auth::MIN_HASH_COST,
                auth::MAX_HASH_COST
            )));
        }
        if !(1..=session::MAX_TTL_MINUTES).contains(&self.session.ttl_minutes) {
            return Err(AppError::configuration(format!(
                "session.ttl_minutes must be between 1 and {}",
                session::MAX_TTL_MINUTES
            )));
        }
        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::configuration(
                "session.cookie_name must be non-empty and use only [A-Za-z0-9_-]",
            ));
        }
        if self.session.same_site == SameSite::None && !self.session.cookie_secure {
            return Err(AppError::configuration(
                "session.same_site = \"none\" requires session.cookie_secure = true",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.hash_cost, 8);
        assert_eq!(config.session.cookie_name, "authgate_sid");
    }

    #[test]
    fn test_rejects_out_of_range_cost() {
        let mut config = AppConfig::default();
        config.auth.hash_cost = 31;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_ttl() {
        let mut config = AppConfig::default();
        config.session.ttl_minutes = 0;
        assert!(config.validate().is_err());
        config.session.ttl_minutes = u64::MAX;
        assert!(config.validate().is_err());
        config.session.ttl_minutes = session::MAX_TTL_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_same_site_none_without_secure() {
        let mut config = AppConfig::default();
        config.session.same_site = SameSite::None;
        config.session.cookie_secure = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_toml_deserializes_to_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str("", config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.ttl_minutes, 60 * 24);
    }
}
