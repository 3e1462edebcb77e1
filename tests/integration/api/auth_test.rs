//! Authentication API integration tests
//!
//! Tests for registration, login and the current-user endpoint.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{assert_error, create_test_user, TestApp};

fn registration(email: &str) -> Value {
    json!({
        "email": email,
        "password": "securepassword123",
        "business_registration_number": "123-45-67890",
        "start_dt": "2020-01-01",
        "p_nm": "홍길동"
    })
}

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&registration("Cafe@Example.com"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().expect("token").to_string();

    let me = app.server.get("/api/auth/me").authorization_bearer(token).await;
    assert_eq!(me.status_code(), StatusCode::OK);
    let me: Value = me.json();
    assert_eq!(me["email"], "cafe@example.com");
    assert_eq!(me["business_registration_number"], "1234567890");
    assert_eq!(me["is_admin"], false);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    create_test_user(&app.pool, "cafe@example.com", "password123", false)
        .await
        .expect("seed user");

    let response = app
        .server
        .post("/api/auth/register")
        .json(&registration("cafe@example.com"))
        .await;

    let body = assert_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn test_register_rejects_invalid_fields() {
    let app = TestApp::spawn().await;

    let mut bad_email = registration("not-an-email");
    assert_error(
        &app.server.post("/api/auth/register").json(&bad_email).await,
        StatusCode::BAD_REQUEST,
    );

    bad_email["email"] = json!("short@example.com");
    bad_email["password"] = json!("short");
    assert_error(
        &app.server.post("/api/auth/register").json(&bad_email).await,
        StatusCode::BAD_REQUEST,
    );

    let mut bad_number = registration("number@example.com");
    bad_number["business_registration_number"] = json!("12345");
    assert_error(
        &app.server.post("/api/auth/register").json(&bad_number).await,
        StatusCode::BAD_REQUEST,
    );

    let mut missing = registration("missing@example.com");
    missing.as_object_mut().expect("object").remove("p_nm");
    let body = assert_error(
        &app.server.post("/api/auth/register").json(&missing).await,
        StatusCode::BAD_REQUEST,
    );
    assert_eq!(body["error"], "p_nm is required");
}

#[tokio::test]
async fn test_register_rejected_by_tax_service() {
    let app = TestApp::spawn_with(|config| {
        config.nts.validate = true;
        config.nts.api_key = Some("nts-key".to_string());
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/nts/validate"))
        .and(query_param("serviceKey", "nts-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status_code": "OK",
            "data": [{"b_no": "1234567890", "valid": "02", "valid_msg": "확인할 수 없습니다."}]
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&registration("cafe@example.com"))
        .await;

    let body = assert_error(&response, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("확인할 수 없습니다."));
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    let user = create_test_user(&app.pool, "cafe@example.com", "password123", false)
        .await
        .expect("seed user");

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": " CAFE@example.com ", "password": "password123"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user_id"], user.id);
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = TestApp::spawn().await;
    create_test_user(&app.pool, "cafe@example.com", "password123", false)
        .await
        .expect("seed user");

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "cafe@example.com", "password": "wrongpassword"}))
        .await;
    let unknown_email = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "nobody@example.com", "password": "password123"}))
        .await;

    let a = assert_error(&wrong_password, StatusCode::UNAUTHORIZED);
    let b = assert_error(&unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = TestApp::spawn().await;
    let user = create_test_user(&app.pool, "cafe@example.com", "password123", false)
        .await
        .expect("seed user");
    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(user.id)
        .execute(&app.pool)
        .await
        .expect("deactivate");

    let login = app
        .server
        .post("/api/auth/login")
        .json(&json!({"email": "cafe@example.com", "password": "password123"}))
        .await;
    assert_error(&login, StatusCode::FORBIDDEN);

    // Tokens issued before deactivation stop working
    let me = app.server.get("/api/auth/me").authorization_bearer(user.token).await;
    assert_error(&me, StatusCode::UNAUTHORIZED);
}
