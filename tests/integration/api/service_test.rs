//! Service routes, fallback and authentication guard

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{assert_error, TestApp};

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::spawn().await;

    let root = app.server.get("/").await;
    assert_eq!(root.status_code(), StatusCode::OK);
    assert_eq!(root.json::<Value>(), json!({"message": "Welcome to the Pium API"}));

    let health = app.server.get("/health").await;
    assert_eq!(health.json::<Value>(), json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::spawn().await;

    let response = app.server.get("/api/does-not-exist").await;
    let body = assert_error(&response, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = TestApp::spawn().await;

    for path in ["/api/auth/me", "/api/choice", "/api/requests/latest", "/api/inquiries"] {
        let response = app.server.get(path).await;
        assert_error(&response, StatusCode::UNAUTHORIZED);
    }

    let response = app
        .server
        .post("/api/generate")
        .json(&json!({}))
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .get("/api/auth/me")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_error(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_database_endpoints_answer_503_without_pool() {
    let app = TestApp::spawn_without_database().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "cafe@example.com", "password": "password123"}))
        .await;
    assert_error(&response, StatusCode::SERVICE_UNAVAILABLE);
}
