//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Lowest accepted hash cost exponent.
pub const MIN_HASH_COST: u32 = 3;
/// Highest accepted hash cost exponent (2^20 KiB = 1 GiB of Argon2 memory).
pub const MAX_HASH_COST: u32 = 20;
/// Cost exponent used when nothing else is configured.
pub const DEFAULT_HASH_COST: u32 = 8;

/// Credential and hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hash cost exponent; hashing work scales as `2^hash_cost`.
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
    /// Minimum password length accepted at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length accepted at registration.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Maximum username length.
    #[serde(default = "default_username_max")]
    pub username_max_length: usize,
    /// Which credential store backs registration and login.
    #[serde(default)]
    pub credential_store: CredentialBackend,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            hash_cost: default_hash_cost(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            username_max_length: default_username_max(),
            credential_store: CredentialBackend::default(),
        }
    }
}

/// Credential store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// Process-local map; lost on restart.
    #[default]
    Memory,
    /// PostgreSQL `users` table.
    Postgres,
}

fn default_hash_cost() -> u32 {
    DEFAULT_HASH_COST
}

fn default_password_min() -> usize {
    6
}

fn default_password_max() -> usize {
    256
}

fn default_username_max() -> usize {
    64
}
