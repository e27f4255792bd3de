//! Session store capability.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{SessionChanges, SessionId, SessionRecord};

/// Keyed storage for session records.
///
/// All operations must be atomic per session id. Distinct ids need no
/// cross-locking.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a live record. Unknown and expired ids are both `None`.
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionRecord>>;

    /// Store a record under a freshly issued id, setting its expiry to now + TTL.
    ///
    /// Returns the record as stored, with the refreshed `expires_at`.
    async fn persist(&self, record: SessionRecord) -> AppResult<SessionRecord>;

    /// Merge `changes` into a live record and push its expiry to now + TTL.
    ///
    /// Never creates a record: an unknown, expired or destroyed id yields
    /// `None`. The merge is atomic per id, so concurrent updates to different
    /// keys are all kept.
    async fn update(
        &self,
        id: &SessionId,
        changes: &SessionChanges,
    ) -> AppResult<Option<SessionRecord>>;

    /// Push the expiry of a live record to now + TTL without touching its data.
    ///
    /// Returns `false` if no live record exists.
    async fn touch(&self, id: &SessionId) -> AppResult<bool>;

    /// Remove a record. Removing an absent id is not an error.
    async fn destroy(&self, id: &SessionId) -> AppResult<()>;

    /// Reclaim expired records and return how many were removed.
    async fn sweep_expired(&self) -> AppResult<u64>;
}
