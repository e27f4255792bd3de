//! Capability traits defined in `authgate-core` and implemented by other crates.

pub mod cache;
pub mod credential_store;
pub mod session_store;

pub use cache::CacheProvider;
pub use credential_store::CredentialStore;
pub use session_store::SessionStore;
