//! Credential store capability.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserCredential;

/// Lookup and insertion of registered users.
///
/// Implementations report a duplicate username as
/// [`ErrorKind::Conflict`](crate::error::ErrorKind::Conflict) and backend
/// failures as [`ErrorKind::Store`](crate::error::ErrorKind::Store).
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserCredential>>;

    /// Insert a new user; fails with `Conflict` if the username exists.
    async fn insert(&self, credential: UserCredential) -> AppResult<UserCredential>;
}
