//! Credential store implementations owned by the auth crate.

pub mod memory;

pub use memory::MemoryCredentialStore;
