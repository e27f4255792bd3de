//! Request DTOs.
//!
//! Missing fields deserialize to empty strings so that the service, not the
//! JSON extractor, decides how to reject them.

use serde::{Deserialize, Serialize};

/// Registration request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    #[serde(default)]
    pub username: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}
