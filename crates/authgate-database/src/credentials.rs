//! PostgreSQL-backed credential store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use authgate_core::error::{AppError, ErrorKind};
use authgate_core::result::AppResult;
use authgate_core::traits::CredentialStore;
use authgate_core::types::UserCredential;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Credential store over the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserCredential>> {
        sqlx::query_as::<_, UserCredential>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to find user by username", e))
    }

    async fn insert(&self, credential: UserCredential) -> AppResult<UserCredential> {
        let result = sqlx::query_as::<_, UserCredential>(
            "INSERT INTO users (id, username, password_hash, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(credential.id)
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .bind(credential.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(inserted) => {
                debug!(user_id = %inserted.id, "Inserted user row");
                Ok(inserted)
            }
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(AppError::conflict(format!(
                    "Username '{}' is already taken",
                    credential.username
                )))
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Store,
                "Failed to insert user",
                e,
            )),
        }
    }
}
