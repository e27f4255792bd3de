//! # authgate-database
//!
//! PostgreSQL pool management, embedded migrations, and the
//! `users`-table implementation of [`CredentialStore`](authgate_core::traits::CredentialStore).

pub mod connection;
pub mod credentials;
pub mod migration;

pub use connection::DatabasePool;
pub use credentials::PgCredentialStore;
