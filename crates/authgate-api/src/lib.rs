//! # authgate-api
//!
//! HTTP API layer for AuthGate built on Axum.
//!
//! Provides the auth endpoints, the session middleware that moves the
//! session token between cookies and the [`SessionManager`](authgate_auth::SessionManager),
//! request logging, extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
