//! Password hashing and input validation.

pub mod hasher;
pub mod validator;

pub use hasher::PasswordHasher;
pub use validator::CredentialValidator;
