//! Session store on top of a [`CacheProvider`].
//!
//! Records are stored as JSON under `session:{id}` with the session TTL as the
//! entry TTL, so expiry is enforced by the backend (moka or Redis) and no
//! sweeping is needed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use authgate_cache::CacheManager;
use authgate_cache::keys;
use authgate_core::config::SessionConfig;
use authgate_core::error::AppError;
use authgate_core::result::AppResult;
use authgate_core::traits::{CacheProvider, SessionStore};
use authgate_core::types::{SessionChanges, SessionId, SessionRecord};

/// Attempts at merging an update before giving up on a contended record.
const MAX_UPDATE_ATTEMPTS: usize = 8;

/// Session store that keeps records in the shared cache.
#[derive(Debug, Clone)]
pub struct CacheSessionStore {
    cache: Arc<CacheManager>,
    ttl: Duration,
    ttl_chrono: chrono::Duration,
}

impl CacheSessionStore {
    /// Creates a store whose records live for `ttl` after each persist or touch.
    pub fn new(cache: Arc<CacheManager>, ttl: chrono::Duration) -> AppResult<Self> {
        let std_ttl = ttl
            .to_std()
            .map_err(|_| AppError::configuration("Session TTL must be positive"))?;
        Ok(Self {
            cache,
            ttl: std_ttl,
            ttl_chrono: ttl,
        })
    }

    /// Creates a store using the configured session TTL.
    pub fn from_config(cache: Arc<CacheManager>, config: &SessionConfig) -> AppResult<Self> {
        Self::new(cache, config.ttl())
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    async fn load(&self, id: &SessionId) -> AppResult<Option<SessionRecord>> {
        self.cache.get_json(&keys::session(id.as_str())).await
    }

    async fn persist(&self, mut record: SessionRecord) -> AppResult<SessionRecord> {
        record.expires_at = Utc::now() + self.ttl_chrono;
        self.cache
            .set_json(&keys::session(record.id.as_str()), &record, self.ttl)
            .await?;
        Ok(record)
    }

    // Read, merge, then swap only if nobody wrote in between.
    async fn update(
        &self,
        id: &SessionId,
        changes: &SessionChanges,
    ) -> AppResult<Option<SessionRecord>> {
        let key = keys::session(id.as_str());
        for _ in 0..MAX_UPDATE_ATTEMPTS {
            let Some(current) = self.cache.get(&key).await? else {
                return Ok(None);
            };

            let mut record: SessionRecord = serde_json::from_str(&current)?;
            changes.apply_to(&mut record.data);
            record.expires_at = Utc::now() + self.ttl_chrono;
            let next = serde_json::to_string(&record)?;

            if self
                .cache
                .compare_and_set(&key, &current, &next, self.ttl)
                .await?
            {
                return Ok(Some(record));
            }
            debug!(session_id = %id, "Session changed during update, retrying");
        }

        Err(AppError::store(format!(
            "Session {id} kept changing during update"
        )))
    }

    // The stored `expires_at` is left as written; the entry TTL is authoritative.
    async fn touch(&self, id: &SessionId) -> AppResult<bool> {
        self.cache
            .expire(&keys::session(id.as_str()), self.ttl)
            .await
    }

    async fn destroy(&self, id: &SessionId) -> AppResult<()> {
        self.cache.delete(&keys::session(id.as_str())).await
    }

    async fn sweep_expired(&self) -> AppResult<u64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token;
    use authgate_cache::memory::MemoryCacheProvider;
    use authgate_core::config::cache::MemoryCacheConfig;
    use authgate_core::types::SessionData;

    fn store(ttl: chrono::Duration) -> CacheSessionStore {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(provider)));
        CacheSessionStore::new(cache, ttl).unwrap()
    }

    fn record() -> SessionRecord {
        let now = Utc::now();
        let mut data = SessionData::new();
        data.insert("user".to_string(), serde_json::json!({"username": "alice"}));
        SessionRecord {
            id: token::generate(),
            data,
            created_at: now,
            expires_at: now,
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_cache() {
        let store = store(chrono::Duration::minutes(5));
        let stored = store.persist(record()).await.unwrap();
        let loaded = store.load(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, stored.data);
        assert!(store.touch(&stored.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_destroy_then_load_is_absent() {
        let store = store(chrono::Duration::minutes(5));
        let stored = store.persist(record()).await.unwrap();
        store.destroy(&stored.id).await.unwrap();
        assert!(store.load(&stored.id).await.unwrap().is_none());
        assert!(!store.touch(&stored.id).await.unwrap());
        store.destroy(&stored.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_merges_and_never_creates() {
        let store = store(chrono::Duration::minutes(5));
        let stored = store.persist(record()).await.unwrap();

        let mut theme = SessionChanges::default();
        theme.set("theme", serde_json::json!("dark"));
        let mut lang = SessionChanges::default();
        lang.set("lang", serde_json::json!("fr"));
        store.update(&stored.id, &theme).await.unwrap().unwrap();
        store.update(&stored.id, &lang).await.unwrap().unwrap();

        let loaded = store.load(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.get("user"), stored.data.get("user"));
        assert_eq!(loaded.data.get("theme"), Some(&serde_json::json!("dark")));
        assert_eq!(loaded.data.get("lang"), Some(&serde_json::json!("fr")));

        store.destroy(&stored.id).await.unwrap();
        assert!(store.update(&stored.id, &theme).await.unwrap().is_none());
        assert!(store.load(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_ttl_expires_record() {
        let store = store(chrono::Duration::milliseconds(50));
        let stored = store.persist(record()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;
        assert!(store.load(&stored.id).await.unwrap().is_none());
        assert_eq!(store.sweep_expired().await.unwrap(), 0);
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(provider)));
        assert!(CacheSessionStore::new(cache, chrono::Duration::seconds(-1)).is_err());
    }
}
