//! # authgate-core
//!
//! Core crate for AuthGate. Contains the capability traits the session and
//! credential layers are written against, configuration schemas, domain
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other AuthGate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
