//! Application builder: wires stores, services, router and middleware into an Axum app.

use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use authgate_auth::{
    AuthService, CacheSessionStore, MemoryCredentialStore, MemorySessionStore, SessionManager,
    SessionSweeper,
};
use authgate_cache::CacheManager;
use authgate_core::config::{AppConfig, CredentialBackend, SessionBackend};
use authgate_core::error::AppError;
use authgate_core::traits::{CredentialStore, SessionStore};
use authgate_database::{DatabasePool, PgCredentialStore};

use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}

/// Builds the auth service with the backends selected in `config`.
pub async fn build_auth_service(config: &AppConfig) -> Result<AuthService, AppError> {
    let credentials = build_credential_store(config).await?;
    let sessions = build_session_store(config).await?;
    let manager = Arc::new(SessionManager::new(sessions, config.session.clone()));
    AuthService::from_config(credentials, manager, &config.auth)
}

async fn build_credential_store(config: &AppConfig) -> Result<Arc<dyn CredentialStore>, AppError> {
    match config.auth.credential_store {
        CredentialBackend::Memory => {
            tracing::info!("Using in-memory credential store");
            Ok(Arc::new(MemoryCredentialStore::new()))
        }
        CredentialBackend::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                authgate_database::migration::run_migrations(db.pool()).await?;
            }
            tracing::info!("Using PostgreSQL credential store");
            Ok(Arc::new(PgCredentialStore::new(db.pool().clone())))
        }
    }
}

async fn build_session_store(config: &AppConfig) -> Result<Arc<dyn SessionStore>, AppError> {
    match config.session.store {
        SessionBackend::Memory => {
            tracing::info!(
                ttl_minutes = config.session.ttl_minutes,
                "Using in-memory session store"
            );
            Ok(Arc::new(MemorySessionStore::from_config(&config.session)))
        }
        SessionBackend::Cache => {
            tracing::info!(
                provider = %config.cache.provider,
                ttl_minutes = config.session.ttl_minutes,
                "Using cache-backed session store"
            );
            let cache = Arc::new(CacheManager::new(&config.cache).await?);
            Ok(Arc::new(CacheSessionStore::from_config(cache, &config.session)?))
        }
    }
}

/// Runs the AuthGate server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AuthGate server...");

    let auth = build_auth_service(&config).await?;
    let state = AppState::new(config.clone(), auth);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SessionSweeper::from_manager(Arc::clone(&state.sessions)).spawn(shutdown_rx);

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("AuthGate server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Session sweeper task ended abnormally");
    }

    tracing::info!("AuthGate server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
