//! Registration, login and logout.

use std::sync::Arc;

use tracing::{info, warn};

use authgate_core::config::AuthConfig;
use authgate_core::error::AppError;
use authgate_core::result::AppResult;
use authgate_core::traits::CredentialStore;
use authgate_core::types::{PublicUser, UserCredential};

use crate::password::{CredentialValidator, PasswordHasher};
use crate::session::{SessionHandle, SessionManager};

/// Session key under which the logged-in user's public view is stored.
pub const SESSION_USER_KEY: &str = "user";

/// Composes credential checks with the session lifecycle.
#[derive(Debug, Clone)]
pub struct AuthService {
    /// Registered users.
    credentials: Arc<dyn CredentialStore>,
    /// Session lifecycle.
    sessions: Arc<SessionManager>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Registration input rules.
    validator: CredentialValidator,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<SessionManager>,
        hasher: Arc<PasswordHasher>,
        validator: CredentialValidator,
    ) -> Self {
        Self {
            credentials,
            sessions,
            hasher,
            validator,
        }
    }

    /// Creates an auth service with hasher and validator built from configuration.
    pub fn from_config(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<SessionManager>,
        config: &AuthConfig,
    ) -> AppResult<Self> {
        let hasher = PasswordHasher::new(config.hash_cost)?;
        Ok(Self::new(
            credentials,
            sessions,
            Arc::new(hasher),
            CredentialValidator::new(config),
        ))
    }

    /// The session manager used by this service.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Registers a new user.
    ///
    /// Touches no session state.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<UserCredential> {
        self.validator.validate(username, password)?;

        if self.credentials.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let hash = self.hash_blocking(password).await?;
        let credential = self
            .credentials
            .insert(UserCredential::new(username, hash))
            .await?;

        info!(user_id = %credential.id, username = %credential.username, "User registered");
        Ok(credential)
    }

    /// Checks credentials and, on success, stores the user in `handle`.
    ///
    /// Unknown users and wrong passwords fail identically. No failure path
    /// writes to `handle`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        handle: &mut SessionHandle,
    ) -> AppResult<PublicUser> {
        if username.is_empty() || password.is_empty() {
            warn!("Login rejected: missing username or password");
            return Err(AppError::invalid_credentials());
        }

        let Some(credential) = self.credentials.find_by_username(username).await? else {
            self.verify_dummy_blocking(password).await?;
            warn!(username = %username, "Login failed: unknown user");
            return Err(AppError::invalid_credentials());
        };

        if !self
            .verify_blocking(password, &credential.password_hash)
            .await?
        {
            warn!(username = %username, "Login failed: wrong password");
            return Err(AppError::invalid_credentials());
        }

        let user = credential.public_view();
        handle.rotate_id();
        handle.set(SESSION_USER_KEY, &user)?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(user)
    }

    /// Ends the session behind `handle`. Safe to call without a session.
    pub async fn logout(&self, handle: &mut SessionHandle) -> AppResult<()> {
        let user = self.current_user(handle).unwrap_or(None);
        self.sessions.destroy_session(handle).await?;
        if let Some(user) = user {
            info!(user_id = %user.id, username = %user.username, "User logged out");
        }
        Ok(())
    }

    /// The user stored in `handle`, if any.
    ///
    /// A `"user"` entry that no longer deserializes is a `Serialization` error,
    /// not an anonymous session.
    pub fn current_user(&self, handle: &SessionHandle) -> AppResult<Option<PublicUser>> {
        handle.get_as(SESSION_USER_KEY).map_err(|e| {
            warn!(
                session_id = ?handle.id(),
                error = %e,
                "Stored session user could not be read"
            );
            e
        })
    }

    async fn hash_blocking(&self, password: &str) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))?
    }

    async fn verify_blocking(&self, password: &str, hash: &str) -> AppResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))
    }

    async fn verify_dummy_blocking(&self, password: &str) -> AppResult<()> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))
    }
}
