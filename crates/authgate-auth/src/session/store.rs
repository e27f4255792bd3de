//! In-process session store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;

use authgate_core::config::SessionConfig;
use authgate_core::result::AppResult;
use authgate_core::traits::SessionStore;
use authgate_core::types::{SessionChanges, SessionId, SessionRecord};

/// Session store backed by a sharded concurrent map.
///
/// Each operation holds the shard lock for its id, which serializes
/// `load`/`persist`/`update`/`touch`/`destroy` per session. Expired records are
/// dropped lazily on access and in bulk by [`SessionStore::sweep_expired`].
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<SessionId, SessionRecord>>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Creates an empty store whose records live for `ttl` after each persist.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Creates an empty store using the configured TTL.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.ttl())
    }

    /// Number of records currently held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionRecord>> {
        let now = Utc::now();
        if let Some(entry) = self.sessions.get(id) {
            if !entry.is_expired_at(now) {
                return Ok(Some(entry.value().clone()));
            }
        } else {
            return Ok(None);
        }

        self.sessions.remove_if(id, |_, record| record.is_expired_at(now));
        Ok(None)
    }

    async fn persist(&self, mut record: SessionRecord) -> AppResult<SessionRecord> {
        record.expires_at = Utc::now() + self.ttl;
        self.sessions.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &SessionId,
        changes: &SessionChanges,
    ) -> AppResult<Option<SessionRecord>> {
        let now = Utc::now();
        if let Some(mut entry) = self.sessions.get_mut(id) {
            if !entry.is_expired_at(now) {
                changes.apply_to(&mut entry.data);
                entry.expires_at = now + self.ttl;
                return Ok(Some(entry.value().clone()));
            }
        } else {
            return Ok(None);
        }

        self.sessions.remove_if(id, |_, record| record.is_expired_at(now));
        Ok(None)
    }

    async fn touch(&self, id: &SessionId) -> AppResult<bool> {
        let now = Utc::now();
        if let Some(mut entry) = self.sessions.get_mut(id) {
            if !entry.is_expired_at(now) {
                entry.expires_at = now + self.ttl;
                return Ok(true);
            }
        } else {
            return Ok(false);
        }

        self.sessions.remove_if(id, |_, record| record.is_expired_at(now));
        Ok(false)
    }

    async fn destroy(&self, id: &SessionId) -> AppResult<()> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        let now = Utc::now();
        let mut removed = 0u64;
        self.sessions.retain(|_, record| {
            let live = !record.is_expired_at(now);
            if !live {
                removed += 1;
            }
            live
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token;
    use authgate_core::types::SessionData;

    fn record() -> SessionRecord {
        let now = Utc::now();
        SessionRecord {
            id: token::generate(),
            data: SessionData::new(),
            created_at: now,
            expires_at: now,
        }
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let store = MemorySessionStore::new(Duration::minutes(5));
        let stored = store.persist(record()).await.unwrap();
        assert!(stored.expires_at > Utc::now());

        let loaded = store.load(&stored.id).await.unwrap();
        assert_eq!(loaded, Some(stored));
    }

    #[tokio::test]
    async fn test_unknown_id_is_absent() {
        let store = MemorySessionStore::new(Duration::minutes(5));
        assert!(store.load(&token::generate()).await.unwrap().is_none());
        assert!(!store.touch(&token::generate()).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_record_is_absent_and_reclaimed() {
        let store = MemorySessionStore::new(Duration::milliseconds(20));
        let stored = store.persist(record()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(store.load(&stored.id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_touch_extends_expiry() {
        let store = MemorySessionStore::new(Duration::milliseconds(200));
        let stored = store.persist(record()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(store.touch(&stored.id).await.unwrap());
        let reloaded = store.load(&stored.id).await.unwrap().unwrap();
        assert!(reloaded.expires_at > stored.expires_at);
    }

    #[tokio::test]
    async fn test_update_merges_into_live_record() {
        let store = MemorySessionStore::new(Duration::minutes(5));
        let mut initial = record();
        initial.data.insert("user".to_string(), serde_json::json!("alice"));
        let stored = store.persist(initial).await.unwrap();

        let mut changes = SessionChanges::default();
        changes.set("theme", serde_json::json!("dark"));
        let updated = store.update(&stored.id, &changes).await.unwrap().unwrap();

        assert_eq!(updated.data.get("user"), Some(&serde_json::json!("alice")));
        assert_eq!(updated.data.get("theme"), Some(&serde_json::json!("dark")));
        assert!(updated.expires_at >= stored.expires_at);
        assert_eq!(store.load(&stored.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_never_creates() {
        let store = MemorySessionStore::new(Duration::minutes(5));
        let stored = store.persist(record()).await.unwrap();
        store.destroy(&stored.id).await.unwrap();

        let mut changes = SessionChanges::default();
        changes.set("theme", serde_json::json!("dark"));
        assert!(store.update(&stored.id, &changes).await.unwrap().is_none());
        assert!(store.update(&token::generate(), &changes).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let store = MemorySessionStore::new(Duration::minutes(5));
        let stored = store.persist(record()).await.unwrap();
        store.destroy(&stored.id).await.unwrap();
        store.destroy(&stored.id).await.unwrap();
        assert!(store.load(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let store = MemorySessionStore::new(Duration::milliseconds(20));
        store.persist(record()).await.unwrap();
        store.persist(record()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let long_lived = MemorySessionStore {
            sessions: Arc::clone(&store.sessions),
            ttl: Duration::minutes(5),
        };
        let keep = long_lived.persist(record()).await.unwrap();

        assert_eq!(store.sweep_expired().await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.load(&keep.id).await.unwrap().is_some());
    }
}
