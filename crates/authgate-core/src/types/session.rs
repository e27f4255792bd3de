//! Session records and their opaque identifiers.

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of random bytes behind a session id.
pub const SESSION_ID_BYTES: usize = 32;

/// Encoded length of a session id (URL-safe base64, no padding).
const SESSION_ID_LEN: usize = 43;

/// Arbitrary per-session key/value data.
pub type SessionData = HashMap<String, serde_json::Value>;

/// Key-level edits made to a session during one request.
///
/// A `None` value marks a removed key. Stores merge these into the record
/// they hold, so concurrent requests that touch different keys keep each
/// other's writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionChanges(HashMap<String, Option<serde_json::Value>>);

impl SessionChanges {
    /// Record that `key` now holds `value`.
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), Some(value));
    }

    /// Record that `key` was removed.
    pub fn remove(&mut self, key: impl Into<String>) {
        self.0.insert(key.into(), None);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replay the edits onto `data`.
    pub fn apply_to(&self, data: &mut SessionData) {
        for (key, value) in &self.0 {
            match value {
                Some(value) => {
                    data.insert(key.clone(), value.clone());
                }
                None => {
                    data.remove(key);
                }
            }
        }
    }
}

/// Opaque, unguessable session token.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Encode freshly generated random bytes as a session id.
    pub fn from_random_bytes(bytes: &[u8; SESSION_ID_BYTES]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Accept a client-supplied token only if it has the shape of an id we issue.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != SESSION_ID_LEN {
            return None;
        }
        let decoded = URL_SAFE_NO_PAD.decode(raw).ok()?;
        (decoded.len() == SESSION_ID_BYTES).then(|| Self(raw.to_string()))
    }

    /// The token as sent to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix that is safe to put in logs.
    pub fn log_prefix(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({}…)", self.log_prefix())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.log_prefix())
    }
}

/// Server-side session state keyed by [`SessionId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Token the client presents.
    pub id: SessionId,
    /// Session contents.
    pub data: SessionData,
    /// When the record was first persisted.
    pub created_at: DateTime<Utc>,
    /// When the record stops being loadable.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the record has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_encoding_length() {
        let id = SessionId::from_random_bytes(&[7u8; SESSION_ID_BYTES]);
        assert_eq!(id.as_str().len(), SESSION_ID_LEN);
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_parse_rejects_foreign_tokens() {
        assert!(SessionId::parse("").is_none());
        assert!(SessionId::parse("deleted").is_none());
        assert!(SessionId::parse(&"!".repeat(SESSION_ID_LEN)).is_none());
    }

    #[test]
    fn test_changes_apply_sets_and_removals() {
        let mut data = SessionData::new();
        data.insert("user".to_string(), serde_json::json!("alice"));
        data.insert("cart".to_string(), serde_json::json!([1, 2]));

        let mut changes = SessionChanges::default();
        changes.set("theme", serde_json::json!("dark"));
        changes.remove("cart");
        changes.apply_to(&mut data);

        assert_eq!(data.get("user"), Some(&serde_json::json!("alice")));
        assert_eq!(data.get("theme"), Some(&serde_json::json!("dark")));
        assert!(!data.contains_key("cart"));
    }

    #[test]
    fn test_display_does_not_leak_full_token() {
        let id = SessionId::from_random_bytes(&[1u8; SESSION_ID_BYTES]);
        assert_eq!(id.to_string().len(), 8);
        assert!(!format!("{id:?}").contains(id.as_str()));
    }
}
