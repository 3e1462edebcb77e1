//! Caption generation API integration tests
//!
//! Generate, choose, current choice and latest request, with the model
//! provider mocked.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{assert_error, mount_completion, sample_brief, three_captions, TestApp};

async fn generate(app: &TestApp, token: &str) -> Value {
    let response = app
        .server
        .post("/api/generate")
        .authorization_bearer(token)
        .json(&sample_brief())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "{}", response.text());
    response.json()
}

#[tokio::test]
async fn test_generate_parses_and_persists_variants() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": three_captions()}}]
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let body = generate(&app, &user.token).await;
    let variants = body["variants"].as_array().expect("variants");
    assert_eq!(variants.len(), 3);
    assert_eq!(
        variants[0]["content"],
        "성수동 아침 커피 ☕ 오늘도 문 열었어요\n\n#성수동 #카페"
    );
    assert_eq!(variants[0]["hashtags"], json!(["성수동", "카페"]));

    let latest = app
        .server
        .get("/api/requests/latest")
        .authorization_bearer(&user.token)
        .await;
    assert_eq!(latest.status_code(), StatusCode::OK);
    let latest: Value = latest.json();
    assert_eq!(latest["request_id"], body["request_id"]);
    assert_eq!(latest["payload"]["store_name"], "피움카페");
    let stored: Vec<&Value> = latest["variants"]
        .as_array()
        .expect("stored variants")
        .iter()
        .map(|v| &v["id"])
        .collect();
    let returned: Vec<&Value> = variants.iter().map(|v| &v["id"]).collect();
    assert_eq!(stored, returned);
}

#[tokio::test]
async fn test_num_variants_caps_parsed_output() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    mount_completion(&app.upstream, &three_captions()).await;

    let mut brief = sample_brief();
    brief["num_variants"] = json!(2);
    let response = app
        .server
        .post("/api/generate")
        .authorization_bearer(&user.token)
        .json(&brief)
        .await;

    let body: Value = response.json();
    assert_eq!(body["variants"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_generate_rejects_invalid_brief() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    let mut brief = sample_brief();
    brief["num_variants"] = json!(9);
    let out_of_range = app
        .server
        .post("/api/generate")
        .authorization_bearer(&user.token)
        .json(&brief)
        .await;
    assert_error(&out_of_range, StatusCode::BAD_REQUEST);

    let mut brief = sample_brief();
    brief["thumbnail_image"] = json!("ftp://example.com/a.jpg");
    let bad_url = app
        .server
        .post("/api/generate")
        .authorization_bearer(&user.token)
        .json(&brief)
        .await;
    assert_error(&bad_url, StatusCode::BAD_REQUEST);

    let malformed = app
        .server
        .post("/api/generate")
        .authorization_bearer(&user.token)
        .text("{\"store_name\": ")
        .content_type("application/json")
        .await;
    assert_error(&malformed, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": {"message": "overloaded"}})),
        )
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .post("/api/generate")
        .authorization_bearer(&user.token)
        .json(&sample_brief())
        .await;

    let body = assert_error(&response, StatusCode::BAD_GATEWAY);
    assert_eq!(body["upstream"]["error"]["message"], "overloaded");
}

#[tokio::test]
async fn test_choose_and_read_choice() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    mount_completion(&app.upstream, &three_captions()).await;

    let none_yet = app.server.get("/api/choice").authorization_bearer(&user.token).await;
    assert_error(&none_yet, StatusCode::NOT_FOUND);

    let body = generate(&app, &user.token).await;
    let picked = body["variants"][1].clone();

    let chosen = app
        .server
        .post("/api/choose")
        .authorization_bearer(&user.token)
        .json(&json!({"variant_id": picked["id"]}))
        .await;
    assert_eq!(chosen.status_code(), StatusCode::OK);
    let chosen: Value = chosen.json();
    assert_eq!(chosen["ok"], true);
    assert_eq!(chosen["content"], picked["content"]);

    let choice: Value = app
        .server
        .get("/api/choice")
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(choice["variant_id"], picked["id"]);
    assert_eq!(choice["content"], picked["content"]);
}

#[tokio::test]
async fn test_only_latest_request_variants_can_be_chosen() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    let other = app.user().await;
    mount_completion(&app.upstream, &three_captions()).await;

    let first = generate(&app, &user.token).await;
    let second = generate(&app, &user.token).await;
    assert_ne!(first["request_id"], second["request_id"]);

    let stale = app
        .server
        .post("/api/choose")
        .authorization_bearer(&user.token)
        .json(&json!({"variant_id": first["variants"][0]["id"]}))
        .await;
    assert_error(&stale, StatusCode::NOT_FOUND);

    // Another user's variant is never visible
    let foreign = app
        .server
        .post("/api/choose")
        .authorization_bearer(&other.token)
        .json(&json!({"variant_id": second["variants"][0]["id"]}))
        .await;
    assert_error(&foreign, StatusCode::NOT_FOUND);

    let blank = app
        .server
        .post("/api/choose")
        .authorization_bearer(&user.token)
        .json(&json!({"variant_id": "  "}))
        .await;
    assert_error(&blank, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_latest_request_not_found() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    let response = app
        .server
        .get("/api/requests/latest")
        .authorization_bearer(&user.token)
        .await;
    assert_error(&response, StatusCode::NOT_FOUND);
}
