//! Session management configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest accepted session TTL: ten years, in minutes.
pub const MAX_TTL_MINUTES: u64 = 60 * 24 * 365 * 10;

/// Session lifecycle and cookie transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Time-to-live of a session record since its last persist, in minutes.
    #[serde(default = "default_ttl")]
    pub ttl_minutes: u64,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Add the `Secure` attribute to the session cookie.
    #[serde(default)]
    pub cookie_secure: bool,
    /// `SameSite` attribute of the session cookie.
    #[serde(default)]
    pub same_site: SameSite,
    /// Refresh the expiry of a live session on every request that reads it.
    #[serde(default = "default_true")]
    pub rolling: bool,
    /// Interval of the background expiry sweep, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Which session store backs session records.
    #[serde(default)]
    pub store: SessionBackend,
}

impl SessionConfig {
    /// Session TTL as a chrono duration, capped at [`MAX_TTL_MINUTES`].
    pub fn ttl(&self) -> chrono::Duration {
        let minutes = self.ttl_minutes.min(MAX_TTL_MINUTES);
        chrono::Duration::minutes(minutes as i64)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_ttl(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            same_site: SameSite::default(),
            rolling: default_true(),
            sweep_interval_seconds: default_sweep_interval(),
            store: SessionBackend::default(),
        }
    }
}

/// Session store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// Process-local map with a background sweeper.
    #[default]
    Memory,
    /// The configured cache provider (in-process moka or Redis).
    Cache,
}

/// Cookie `SameSite` policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    #[default]
    Lax,
    /// `SameSite=None` (requires `Secure`)
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

fn default_ttl() -> u64 {
    60 * 24
}

fn default_cookie_name() -> String {
    "authgate_sid".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    300
}
