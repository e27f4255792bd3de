//! Per-request view over a session.
//!
//! A handle starts either `Bound` to a record loaded from the store or
//! `Unbound` (an empty placeholder). Reads never change it. Writes mark it
//! dirty, and only a dirty handle makes the manager persist anything or hand a
//! token to the client.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use authgate_core::result::AppResult;
use authgate_core::types::{SessionChanges, SessionData, SessionId, SessionRecord};

/// Whether a handle is backed by a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No live record matched the inbound token.
    Unbound,
    /// The inbound token resolved to a live record.
    Bound,
}

/// A transient, per-request view over a session record.
#[derive(Debug, Default)]
pub struct SessionHandle {
    id: Option<SessionId>,
    created_at: Option<DateTime<Utc>>,
    data: SessionData,
    changes: SessionChanges,
    dirty: bool,
    rotate: bool,
    destroyed: bool,
}

/// Everything the manager needs from a finished handle.
#[derive(Debug)]
pub(crate) struct HandleParts {
    pub id: Option<SessionId>,
    pub created_at: Option<DateTime<Utc>>,
    pub data: SessionData,
    pub changes: SessionChanges,
    pub dirty: bool,
    pub rotate: bool,
    pub destroyed: bool,
}

impl SessionHandle {
    /// A placeholder handle with no backing record.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// A handle over a record loaded from the store.
    pub fn bound(record: SessionRecord) -> Self {
        Self {
            id: Some(record.id),
            created_at: Some(record.created_at),
            data: record.data,
            ..Self::default()
        }
    }

    /// Current state.
    pub fn state(&self) -> HandleState {
        if self.id.is_some() {
            HandleState::Bound
        } else {
            HandleState::Unbound
        }
    }

    /// Whether a stored record backs this handle.
    pub fn is_bound(&self) -> bool {
        self.state() == HandleState::Bound
    }

    /// Whether a write happened during this request.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the session was actively terminated during this request.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The id of the backing record, if bound.
    pub fn id(&self) -> Option<&SessionId> {
        self.id.as_ref()
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Typed value for `key`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.data.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Store a value and mark the handle dirty.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> AppResult<()> {
        let key = key.into();
        let value = serde_json::to_value(value)?;
        self.changes.set(key.clone(), value.clone());
        self.data.insert(key, value);
        self.dirty = true;
        Ok(())
    }

    /// Remove a value; marks the handle dirty only if something was removed.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.changes.remove(key);
            self.dirty = true;
        }
        removed
    }

    /// Ask for the record to be re-keyed under a fresh id when it is next persisted.
    ///
    /// No effect on an unbound handle, which gets a fresh id anyway.
    pub fn rotate_id(&mut self) {
        if self.is_bound() {
            self.rotate = true;
        }
    }

    /// Drop all state and remember that the client token must be cleared.
    ///
    /// Returns the id that was bound, if any.
    pub(crate) fn mark_destroyed(&mut self) -> Option<SessionId> {
        self.data.clear();
        self.changes = SessionChanges::default();
        self.created_at = None;
        self.dirty = false;
        self.rotate = false;
        self.destroyed = true;
        self.id.take()
    }

    pub(crate) fn into_parts(self) -> HandleParts {
        HandleParts {
            id: self.id,
            created_at: self.created_at,
            data: self.data,
            changes: self.changes,
            dirty: self.dirty,
            rotate: self.rotate,
            destroyed: self.destroyed,
        }
    }
}
