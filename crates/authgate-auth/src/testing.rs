//! Store doubles for tests: in-memory stores that count calls and can be
//! switched into failure mode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use authgate_core::error::AppError;
use authgate_core::result::AppResult;
use authgate_core::traits::{CredentialStore, SessionStore};
use authgate_core::types::{SessionChanges, SessionId, SessionRecord, UserCredential};

use crate::credential::MemoryCredentialStore;
use crate::session::MemorySessionStore;

/// Wraps a [`MemorySessionStore`], counting calls and failing on demand.
#[derive(Debug)]
pub struct InstrumentedSessionStore {
    inner: MemorySessionStore,
    persists: AtomicUsize,
    updates: AtomicUsize,
    touches: AtomicUsize,
    destroys: AtomicUsize,
    fail_load: AtomicBool,
    fail_persist: AtomicBool,
    fail_destroy: AtomicBool,
}

impl InstrumentedSessionStore {
    pub fn new(inner: MemorySessionStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            persists: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            touches: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
            fail_load: AtomicBool::new(false),
            fail_persist: AtomicBool::new(false),
            fail_destroy: AtomicBool::new(false),
        })
    }

    pub fn inner(&self) -> &MemorySessionStore {
        &self.inner
    }

    pub fn persist_calls(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn touch_calls(&self) -> usize {
        self.touches.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    pub fn fail_destroy(&self, fail: bool) {
        self.fail_destroy.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for InstrumentedSessionStore {
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionRecord>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(AppError::store("session backend unavailable"));
        }
        self.inner.load(id).await
    }

    async fn persist(&self, record: SessionRecord) -> AppResult<SessionRecord> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(AppError::store("session backend unavailable"));
        }
        self.inner.persist(record).await
    }

    async fn update(
        &self,
        id: &SessionId,
        changes: &SessionChanges,
    ) -> AppResult<Option<SessionRecord>> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(AppError::store("session backend unavailable"));
        }
        self.inner.update(id, changes).await
    }

    async fn touch(&self, id: &SessionId) -> AppResult<bool> {
        self.touches.fetch_add(1, Ordering::SeqCst);
        self.inner.touch(id).await
    }

    async fn destroy(&self, id: &SessionId) -> AppResult<()> {
        self.destroys.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(AppError::store("session backend unavailable"));
        }
        self.inner.destroy(id).await
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        self.inner.sweep_expired().await
    }
}

/// Wraps a [`MemoryCredentialStore`] and fails lookups on demand.
#[derive(Debug, Default)]
pub struct FlakyCredentialStore {
    inner: MemoryCredentialStore,
    fail: AtomicBool,
}

impl FlakyCredentialStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for FlakyCredentialStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserCredential>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::store("credential backend unavailable"));
        }
        self.inner.find_by_username(username).await
    }

    async fn insert(&self, credential: UserCredential) -> AppResult<UserCredential> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::store("credential backend unavailable"));
        }
        self.inner.insert(credential).await
    }
}
