//! `Session` extractor: the request's session handle, installed by the
//! session middleware.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tokio::sync::{Mutex, MutexGuard};

use authgate_auth::SessionHandle;
use authgate_core::error::AppError;

use crate::error::ApiError;

/// Shared slot holding the current request's [`SessionHandle`].
///
/// The middleware keeps one clone and takes the handle back out after the
/// handler returns.
#[derive(Debug, Clone)]
pub struct Session(Arc<Mutex<SessionHandle>>);

impl Session {
    pub(crate) fn new(handle: SessionHandle) -> Self {
        Self(Arc::new(Mutex::new(handle)))
    }

    /// Exclusive access to the handle.
    pub async fn lock(&self) -> MutexGuard<'_, SessionHandle> {
        self.0.lock().await
    }

    pub(crate) async fn take(&self) -> SessionHandle {
        std::mem::take(&mut *self.0.lock().await)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::internal("Session middleware is not installed").into())
    }
}
