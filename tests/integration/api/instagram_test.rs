//! Instagram publishing API integration tests
//!
//! The Graph API is mocked under `/graph`.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{assert_error, mount_completion, sample_brief, three_captions, TestApp};

#[tokio::test]
async fn test_dry_run_creates_container_only() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    Mock::given(method("POST"))
        .and(path("/graph/1784/media"))
        .and(query_param("image_url", "https://cdn.test/a.jpg"))
        .and(query_param("caption", "오늘의 커피"))
        .and(query_param("access_token", "EAAG"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1"})))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/graph/1784/media_publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "never"})))
        .expect(0)
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({
            "caption": "  오늘의 커피 ",
            "image_url": "https://cdn.test/a.jpg",
            "dry_run": true
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["creation_id"], "c1");
    assert_eq!(body["published"], false);
    assert_eq!(body["media_id"], Value::Null);
}

#[tokio::test]
async fn test_publish_uses_chosen_caption() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    mount_completion(&app.upstream, &three_captions()).await;

    let generated: Value = app
        .server
        .post("/api/generate")
        .authorization_bearer(&user.token)
        .json(&sample_brief())
        .await
        .json();
    let variant = generated["variants"][0].clone();
    app.server
        .post("/api/choose")
        .authorization_bearer(&user.token)
        .json(&json!({"variant_id": variant["id"]}))
        .await
        .assert_status_ok();

    let caption = variant["content"].as_str().expect("caption");
    Mock::given(method("POST"))
        .and(path("/graph/1784/media"))
        .and(query_param("caption", caption))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1"})))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/graph/1784/media_publish"))
        .and(query_param("creation_id", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "m1"})))
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/graph/m1"))
        .and(query_param("fields", "permalink"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m1",
            "permalink": "https://www.instagram.com/p/Abc123/"
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({"image_url": "https://cdn.test/a.jpg"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["published"], true);
    assert_eq!(body["media_id"], "m1");
    assert_eq!(body["permalink"], "https://www.instagram.com/p/Abc123/");
    assert_eq!(body["verified_by_fallback"], false);
}

#[tokio::test]
async fn test_publish_without_caption_or_choice() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    let response = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({"image_url": "https://cdn.test/a.jpg", "caption": "   "}))
        .await;

    let body = assert_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No caption given and no variant chosen");
}

#[tokio::test]
async fn test_publish_request_validation() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    let no_image = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({"caption": "hi"}))
        .await;
    assert_error(&no_image, StatusCode::BAD_REQUEST);

    let urls: Vec<String> = (0..11).map(|i| format!("https://cdn.test/{i}.jpg")).collect();
    let too_many_images = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({"caption": "hi", "image_urls": urls}))
        .await;
    assert_error(&too_many_images, StatusCode::BAD_REQUEST);

    let too_many_collaborators = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({
            "caption": "hi",
            "image_url": "https://cdn.test/a.jpg",
            "collaborators": ["a", "b", "c", "d"]
        }))
        .await;
    assert_error(&too_many_collaborators, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limited_publish_without_matching_post() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    Mock::given(method("POST"))
        .and(path("/graph/1784/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1"})))
        .mount(&app.upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/graph/1784/media_publish"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Application request limit reached", "code": 4}
        })))
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/graph/1784/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "m0", "caption": "an older post", "permalink": "https://www.instagram.com/p/Old/"}]
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/ig/publish")
        .authorization_bearer(&user.token)
        .json(&json!({"caption": "새 글", "image_url": "https://cdn.test/a.jpg"}))
        .await;

    let body = assert_error(&response, StatusCode::BAD_GATEWAY);
    assert_eq!(body["upstream"]["error"]["code"], 4);
}

#[tokio::test]
async fn test_latest_post_by_username() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    Mock::given(method("GET"))
        .and(path("/graph/1784"))
        .and(query_param(
            "fields",
            "business_discovery.username(pium.cafe){media.limit(1){id,caption,permalink,timestamp}}",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "business_discovery": {"media": {"data": [{
                "id": "1789",
                "caption": "hello",
                "permalink": "https://www.instagram.com/p/AbC/",
                "timestamp": "2025-05-01T10:00:00+0000"
            }]}}
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .get("/api/instagram/latest-post")
        .authorization_bearer(&user.token)
        .add_query_param("username", "@pium.cafe")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    let body: Value = response.json();
    assert_eq!(body["id"], "1789");
    assert_eq!(body["shortcode"], "AbC");
}

#[tokio::test]
async fn test_latest_post_not_found() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    Mock::given(method("GET"))
        .and(path("/graph/1784/media"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .get("/api/instagram/latest-post")
        .authorization_bearer(&user.token)
        .await;

    let body = assert_error(&response, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No posts found");
}
