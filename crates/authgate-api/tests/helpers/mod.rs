//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use authgate_api::AppState;
use authgate_auth::testing::InstrumentedSessionStore;
use authgate_auth::{AuthService, MemoryCredentialStore, MemorySessionStore, SessionManager};
use authgate_core::config::AppConfig;
use authgate_core::config::auth::MIN_HASH_COST;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Session store, for call counts and failure injection
    pub sessions: Arc<InstrumentedSessionStore>,
    /// Credential store
    pub users: Arc<MemoryCredentialStore>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application backed by in-memory stores
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.hash_cost = MIN_HASH_COST;

        let users = Arc::new(MemoryCredentialStore::new());
        let sessions =
            InstrumentedSessionStore::new(MemorySessionStore::from_config(&config.session));
        let manager = Arc::new(SessionManager::new(
            sessions.clone(),
            config.session.clone(),
        ));
        let auth = AuthService::from_config(users.clone(), manager, &config.auth)
            .expect("Failed to build auth service");

        let router = authgate_api::build_app(AppState::new(config.clone(), auth));

        Self {
            router,
            sessions,
            users,
            config,
        }
    }

    /// Register a user through the API
    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({ "username": username, "password": password })),
            None,
        )
        .await
    }

    /// Login and return the session token from `Set-Cookie`
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.session_token().expect("No session cookie in login response")
    }

    /// Make an HTTP request to the test app, optionally presenting a session token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(COOKIE, format!("{}={}", self.config.session.cookie_name, token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            set_cookie,
            cookie_name: self.config.session.cookie_name.clone(),
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// Raw `Set-Cookie` header, if any
    pub set_cookie: Option<String>,
    cookie_name: String,
}

impl TestResponse {
    /// Token carried by a non-empty session cookie, if one was set
    pub fn session_token(&self) -> Option<String> {
        let cookie = self.set_cookie.as_deref()?;
        let (pair, _) = cookie.split_once(';')?;
        let value = pair.strip_prefix(&format!("{}=", self.cookie_name))?;
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Whether the response tells the client to drop its session cookie
    pub fn clears_session(&self) -> bool {
        self.set_cookie
            .as_deref()
            .is_some_and(|c| c.starts_with(&format!("{}=;", self.cookie_name)) && c.contains("Max-Age=0"))
    }
}
