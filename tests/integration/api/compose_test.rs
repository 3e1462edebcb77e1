//! Card composition API integration tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    assert_error, mount_object, mount_object_store, png_bytes, TestApp, TEST_BUCKET,
};

#[tokio::test]
async fn test_compose_card_uploads_jpeg() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    mount_object(&app.upstream, "bg/spring.png", png_bytes(216, 270, [250, 180, 200])).await;
    mount_object(&app.upstream, "uploads/s1/photo.png", png_bytes(320, 240, [90, 60, 30])).await;
    mount_object_store(&app.upstream).await;

    let response = app
        .server
        .post("/api/compose/card")
        .authorization_bearer(&user.token)
        .json(&json!({
            "bg_key": "bg/spring.png",
            "image_key": "uploads/s1/photo.png",
            "store_name": "Pium Cafe",
            "area_keywords": ["Seongsu"],
            "session_id": "s1"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    let key = body["rel"].as_str().expect("rel");
    assert!(key.starts_with("composed/s1/") && key.ends_with(".jpg"), "{key}");
    assert!(body["url"].as_str().expect("url").contains("X-Amz-Signature="));

    let puts: Vec<_> = app
        .upstream
        .received_requests()
        .await
        .expect("recorded requests")
        .into_iter()
        .filter(|r| r.method.as_str() == "PUT")
        .collect();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].url.path(), format!("/{TEST_BUCKET}/{key}"));
    let card = image::load_from_memory(&puts[0].body).expect("decodable card");
    assert_eq!((card.width(), card.height()), (1080, 1350));
}

#[tokio::test]
async fn test_compose_card_blank_store_name() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    Mock::given(method("GET"))
        .and(path_regex(format!("^/{TEST_BUCKET}/")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/compose/card")
        .authorization_bearer(&user.token)
        .json(&json!({"image_key": "uploads/s1/photo.png", "store_name": "   "}))
        .await;

    assert_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compose_card_missing_photo_is_bad_gateway() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    mount_object(&app.upstream, "assets/bg/gradient.jpg", png_bytes(10, 10, [0, 0, 0])).await;

    let response = app
        .server
        .post("/api/compose/card")
        .authorization_bearer(&user.token)
        .json(&json!({"image_key": "uploads/s1/missing.png", "store_name": "Pium Cafe"}))
        .await;

    assert_error(&response, StatusCode::BAD_GATEWAY);
}
