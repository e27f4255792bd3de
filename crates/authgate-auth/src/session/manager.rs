//! Session manager.
//!
//! Turns an inbound token into a [`SessionHandle`] at the start of a request
//! and decides, at the end of the request, whether anything has to be written
//! to the store and sent back to the client.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

use authgate_core::config::SessionConfig;
use authgate_core::error::ErrorKind;
use authgate_core::result::AppResult;
use authgate_core::traits::SessionStore;
use authgate_core::types::{SessionId, SessionRecord};

use super::handle::SessionHandle;
use super::token;

/// What the transport layer has to do with the client token after a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Leave the client token alone.
    Unchanged,
    /// Send `id` to the client; it stays valid for `max_age`.
    Issue {
        id: SessionId,
        expires_at: DateTime<Utc>,
        max_age: Duration,
    },
    /// Tell the client to drop its token.
    Clear,
}

/// Coordinates session handles with the backing [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Session configuration in effect.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Resolve the inbound token into a handle.
    ///
    /// A missing, malformed, unknown or expired token yields an unbound
    /// handle. Only a store failure is an error.
    pub async fn load(&self, token: Option<&str>) -> AppResult<SessionHandle> {
        let Some(id) = token.and_then(SessionId::parse) else {
            return Ok(SessionHandle::unbound());
        };

        match self.store.load(&id).await? {
            Some(record) => {
                debug!(session_id = %id, "Session loaded");
                Ok(SessionHandle::bound(record))
            }
            None => {
                debug!(session_id = %id, "Inbound token matched no live session");
                Ok(SessionHandle::unbound())
            }
        }
    }

    /// Settle the handle at the end of a request.
    ///
    /// Only a dirty handle is written, and only a written handle results in
    /// [`SessionOutcome::Issue`]. A bound handle is written as a merge into
    /// the stored record; if that record is gone (logged out or expired
    /// meanwhile) nothing is recreated and the client token is cleared.
    pub async fn finalize(&self, handle: SessionHandle) -> AppResult<SessionOutcome> {
        let parts = handle.into_parts();

        if parts.dirty {
            let now = Utc::now();
            let id = match parts.id {
                Some(old) if parts.rotate => {
                    self.store.destroy(&old).await?;
                    let fresh = token::generate();
                    info!(old_session = %old, session_id = %fresh, "Session id rotated");
                    fresh
                }
                Some(existing) => {
                    return match self.store.update(&existing, &parts.changes).await? {
                        Some(stored) => Ok(self.issue(stored)),
                        None => {
                            info!(
                                session_id = %existing,
                                "Session ended before its changes were saved"
                            );
                            Ok(SessionOutcome::Clear)
                        }
                    };
                }
                None => {
                    let fresh = token::generate();
                    info!(session_id = %fresh, "Session created");
                    fresh
                }
            };

            let record = SessionRecord {
                id,
                data: parts.data,
                created_at: parts.created_at.unwrap_or(now),
                expires_at: now,
            };
            let stored = self.store.persist(record).await?;
            return Ok(self.issue(stored));
        }

        if parts.destroyed {
            return Ok(SessionOutcome::Clear);
        }

        if let Some(id) = parts.id {
            if self.config.rolling && !self.store.touch(&id).await? {
                debug!(session_id = %id, "Session expired before it could be refreshed");
            }
        }

        Ok(SessionOutcome::Unchanged)
    }

    fn issue(&self, stored: SessionRecord) -> SessionOutcome {
        SessionOutcome::Issue {
            id: stored.id,
            expires_at: stored.expires_at,
            max_age: self.config.ttl(),
        }
    }

    /// Terminate the session behind `handle`.
    ///
    /// The handle is marked destroyed before the store is called, so the
    /// client token is cleared at finalize even if removal fails. Calling
    /// this on an unbound handle touches no store.
    pub async fn destroy_session(&self, handle: &mut SessionHandle) -> AppResult<()> {
        let Some(id) = handle.mark_destroyed() else {
            return Ok(());
        };

        self.store.destroy(&id).await.map_err(|e| {
            error!(session_id = %id, error = %e, "Failed to destroy session");
            e.into_kind(ErrorKind::SessionDestroy)
        })?;

        info!(session_id = %id, "Session destroyed");
        Ok(())
    }

    /// Reclaim expired records.
    pub async fn sweep_expired(&self) -> AppResult<u64> {
        self.store.sweep_expired().await
    }
}
