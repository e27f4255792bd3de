//! AuthGate Server — username/password authentication with server-side sessions
//!
//! Main entry point: loads configuration, initializes logging, and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use authgate_core::config::AppConfig;
use authgate_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("AUTHGATE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match load_configuration(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Starting AuthGate v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = authgate_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/default`, `config/<env>`, and `AUTHGATE__*` variables
fn load_configuration(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
