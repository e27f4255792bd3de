//! In-memory credential store for single-node deployments and tests.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use authgate_core::error::AppError;
use authgate_core::result::AppResult;
use authgate_core::traits::CredentialStore;
use authgate_core::types::UserCredential;

/// Credential store backed by a concurrent map keyed by username.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<DashMap<String, UserCredential>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserCredential>> {
        Ok(self.users.get(username).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, credential: UserCredential) -> AppResult<UserCredential> {
        match self.users.entry(credential.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                credential.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(credential.clone());
                Ok(credential)
            }
        }
    }
}
