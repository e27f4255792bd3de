//! Registered user credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as held by the credential store.
///
/// Created on registration and immutable afterwards. The hash is a PHC
/// string; plaintext never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UserCredential {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// PHC-encoded password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl UserCredential {
    /// Build a fresh credential for an already-hashed password.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// The client-facing view of this user.
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

/// The view of a user that may leave the server and live in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// User identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_never_serialized() {
        let cred = UserCredential::new("alice", "$argon2id$v=19$m=256,t=2,p=1$c2FsdA$ZGlnZXN0");
        let json = serde_json::to_value(&cred).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_public_view_matches_credential() {
        let cred = UserCredential::new("bob", "hash");
        let view = cred.public_view();
        assert_eq!(view.id, cred.id);
        assert_eq!(view.username, "bob");
    }
}
