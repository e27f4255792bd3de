//! Session cookie transport.
//!
//! Reads the session token from the request cookie, hands the handler a
//! [`Session`], and after the handler returns lets the manager finalize the
//! handle. A `Set-Cookie` header is only written when the manager issues or
//! clears a token.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Cookie, HeaderMapExt};

use authgate_auth::SessionOutcome;
use authgate_core::config::SessionConfig;
use authgate_core::error::AppError;
use authgate_core::result::AppResult;

use crate::error::ApiError;
use crate::extractors::Session;
use crate::state::AppState;

/// Loads the session before the handler and finalizes it afterwards.
///
/// If finalizing fails the handler's response is replaced by the error.
pub async fn session_layer(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let config = state.sessions.config();
    let token = request
        .headers()
        .typed_get::<Cookie>()
        .and_then(|cookies| cookies.get(&config.cookie_name).map(str::to_owned));

    let handle = match state.sessions.load(token.as_deref()).await {
        Ok(handle) => handle,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let session = Session::new(handle);
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let handle = session.take().await;
    let cookie = match state.sessions.finalize(handle).await {
        Ok(SessionOutcome::Unchanged) => return response,
        Ok(SessionOutcome::Issue { id, max_age, .. }) => {
            session_cookie(config, id.as_str(), max_age.num_seconds())
        }
        Ok(SessionOutcome::Clear) => clear_cookie(config),
        Err(e) => return ApiError::from(e).into_response(),
    };

    match cookie {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
            response
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// `Set-Cookie` value that hands `token` to the client for `max_age_secs`.
pub fn session_cookie(config: &SessionConfig, token: &str, max_age_secs: i64) -> AppResult<HeaderValue> {
    cookie_header(config, token, max_age_secs)
}

/// `Set-Cookie` value that makes the client drop its token.
pub fn clear_cookie(config: &SessionConfig) -> AppResult<HeaderValue> {
    cookie_header(config, "", 0)
}

fn cookie_header(config: &SessionConfig, value: &str, max_age_secs: i64) -> AppResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        config.cookie_name,
        value,
        config.same_site,
        max_age_secs.max(0)
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid Set-Cookie header: {e}")))
}
