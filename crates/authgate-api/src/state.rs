//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use authgate_auth::{AuthService, SessionManager};
use authgate_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session lifecycle, used by the session middleware
    pub sessions: Arc<SessionManager>,
    /// Register / login / logout
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Creates the state from an auth service and the configuration it was built from.
    pub fn new(config: AppConfig, auth: AuthService) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::clone(auth.sessions()),
            auth: Arc::new(auth),
        }
    }
}
