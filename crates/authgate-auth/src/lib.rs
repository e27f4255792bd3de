//! # authgate-auth
//!
//! Credential verification and the session lifecycle for AuthGate.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing with an exponential cost factor, input validation
//! - `credential` — in-memory [`CredentialStore`](authgate_core::traits::CredentialStore)
//! - `session` — per-request handles, the lazy-materialization manager, stores, sweeper
//! - `service` — register / login / logout orchestration

pub mod credential;
pub mod password;
pub mod service;
pub mod session;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use credential::MemoryCredentialStore;
pub use password::{CredentialValidator, PasswordHasher};
pub use service::AuthService;
pub use session::{
    CacheSessionStore, MemorySessionStore, SessionHandle, SessionManager, SessionOutcome,
    SessionSweeper,
};
