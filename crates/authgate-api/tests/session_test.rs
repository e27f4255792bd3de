//! Integration tests for the session lifecycle over HTTP.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_logout_clears_cookie_and_record() {
    let app = helpers::TestApp::new();
    app.register("alice", "secret1").await;
    let token = app.login("alice", "secret1").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "logged out");
    assert!(response.clears_session());
    assert!(app.sessions.inner().is_empty());

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_twice_never_errors_or_creates() {
    let app = helpers::TestApp::new();
    app.register("alice", "secret1").await;
    let token = app.login("alice", "secret1").await;

    let first = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    let second = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    let anonymous = app.request("POST", "/api/auth/logout", None, None).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(anonymous.status, StatusCode::OK);
    assert!(app.sessions.inner().is_empty());
    assert_eq!(app.sessions.persist_calls(), 1);
}

#[tokio::test]
async fn test_read_only_requests_never_persist() {
    let app = helpers::TestApp::new();
    app.register("alice", "secret1").await;
    let token = app.login("alice", "secret1").await;
    let persisted = app.sessions.persist_calls();

    for _ in 0..3 {
        let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.set_cookie.is_none());
    }
    app.request("GET", "/api/health", None, None).await;

    assert_eq!(app.sessions.persist_calls(), persisted);
    assert_eq!(app.sessions.update_calls(), 0);
}

#[tokio::test]
async fn test_relogin_rotates_token() {
    let app = helpers::TestApp::new();
    app.register("alice", "secret1").await;
    let first = app.login("alice", "secret1").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "alice", "password": "secret1" })),
            Some(&first),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let second = response.session_token().unwrap();

    assert_ne!(first, second);
    let stale = app.request("GET", "/api/auth/me", None, Some(&first)).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    let fresh = app.request("GET", "/api/auth/me", None, Some(&second)).await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_garbage_cookie_is_treated_as_anonymous() {
    let app = helpers::TestApp::new();
    let response = app
        .request("GET", "/api/auth/me", None, Some("definitely-not-a-session"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.set_cookie.is_none());
}

#[tokio::test]
async fn test_logout_store_failure_still_clears_cookie() {
    let app = helpers::TestApp::new();
    app.register("alice", "secret1").await;
    let token = app.login("alice", "secret1").await;
    app.sessions.fail_destroy(true);

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "SESSION_DESTROY_ERROR");
    assert!(response.clears_session());
}

#[tokio::test]
async fn test_session_store_failure_is_500() {
    let app = helpers::TestApp::new();
    app.register("alice", "secret1").await;
    app.sessions.fail_persist(true);

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "alice", "password": "secret1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "STORE_ERROR");
    assert!(response.set_cookie.is_none());
}
