//! Toss payments API integration tests
//!
//! Toss is mocked under `/toss`; orders and subscriptions live in the
//! application's in-memory ledger.

use axum::http::StatusCode;
use axum_test::TestResponse;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{assert_error, TestApp, TEST_FRONT};

fn location(response: &TestResponse) -> String {
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header")
        .to_string()
}

async fn create_order(app: &TestApp, token: &str, order_id: &str, amount: i64) -> TestResponse {
    app.server
        .post("/api/payments/toss/orders")
        .authorization_bearer(token)
        .json(&json!({"order_id": order_id, "amount": amount, "order_name": "Pium Basic"}))
        .await
}

async fn mount_confirm(app: &TestApp) {
    Mock::given(method("POST"))
        .and(path("/toss/v1/payments/confirm"))
        .and(header("authorization", "Basic dGVzdF9za19hYmM6"))
        .and(header("idempotency-key", "order_0001:pk_1"))
        .and(body_json(json!({"paymentKey": "pk_1", "orderId": "order_0001", "amount": 9900})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentKey": "pk_1",
            "orderId": "order_0001",
            "method": "카드",
            "approvedAt": "2025-05-01T10:00:00+09:00"
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
}

#[tokio::test]
async fn test_order_checkout_success_flow() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    mount_confirm(&app).await;

    let created = create_order(&app, &user.token, "order_0001", 9900).await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let created: Value = created.json();
    assert_eq!(created["orderId"], "order_0001");
    assert_eq!(created["successUrl"], "http://api.test/api/payments/toss/success");
    assert_eq!(created["failUrl"], "http://api.test/api/payments/toss/fail");

    let confirmed = app
        .server
        .get("/api/payments/toss/success")
        .add_query_param("paymentKey", "pk_1")
        .add_query_param("orderId", "order_0001")
        .add_query_param("amount", 9900)
        .await;
    assert_eq!(confirmed.status_code(), StatusCode::OK, "{}", confirmed.text());
    let confirmed: Value = confirmed.json();
    assert_eq!(confirmed["status"], "PAID");
    assert_eq!(confirmed["method"], "카드");

    // The widget may redirect twice; Toss is only called once
    let repeated: Value = app
        .server
        .get("/api/payments/toss/success")
        .add_query_param("paymentKey", "pk_1")
        .add_query_param("orderId", "order_0001")
        .add_query_param("amount", 9900)
        .await
        .json();
    assert_eq!(repeated["status"], "PAID");
}

#[tokio::test]
async fn test_checkout_success_rejects_unknown_order_and_amount_mismatch() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    create_order(&app, &user.token, "order_0001", 9900).await;

    let unknown = app
        .server
        .get("/api/payments/toss/success")
        .add_query_param("paymentKey", "pk_1")
        .add_query_param("orderId", "order_9999")
        .add_query_param("amount", 9900)
        .await;
    assert_error(&unknown, StatusCode::NOT_FOUND);

    let mismatch = app
        .server
        .get("/api/payments/toss/success")
        .add_query_param("paymentKey", "pk_1")
        .add_query_param("orderId", "order_0001")
        .add_query_param("amount", 100)
        .await;
    let body = assert_error(&mismatch, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount mismatch");
}

#[tokio::test]
async fn test_confirm_refused_by_toss() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    create_order(&app, &user.token, "order_0001", 9900).await;

    Mock::given(method("POST"))
        .and(path("/toss/v1/payments/confirm"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "REJECT_CARD_COMPANY",
            "message": "카드사 거절"
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .server
        .get("/api/payments/toss/success")
        .add_query_param("paymentKey", "pk_1")
        .add_query_param("orderId", "order_0001")
        .add_query_param("amount", 9900)
        .await;

    let body = assert_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "REJECT_CARD_COMPANY: 카드사 거절");
}

#[tokio::test]
async fn test_create_order_validation() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    assert_error(&create_order(&app, &user.token, "short", 9900).await, StatusCode::BAD_REQUEST);
    assert_error(&create_order(&app, &user.token, "order_0001", 0).await, StatusCode::BAD_REQUEST);

    let anonymous = app
        .server
        .post("/api/payments/toss/orders")
        .json(&json!({"order_id": "order_0001", "amount": 9900, "order_name": "Pium Basic"}))
        .await;
    assert_error(&anonymous, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_fail_callback_redirects_to_plans() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .get("/api/payments/toss/fail")
        .add_query_param("code", "PAY_PROCESS_CANCELED")
        .add_query_param("message", "사용자 취소")
        .add_query_param("orderId", "order_0001")
        .await;

    let target = reqwest::Url::parse(&location(&response)).expect("redirect URL");
    assert_eq!(target.origin().ascii_serialization(), TEST_FRONT);
    assert_eq!(target.path(), "/plans");
    let pairs: Vec<(String, String)> = target.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("payment".to_string(), "fail".to_string()),
            ("code".to_string(), "PAY_PROCESS_CANCELED".to_string()),
            ("message".to_string(), "사용자 취소".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_cancel_requires_owner() {
    let app = TestApp::spawn().await;
    let owner = app.user().await;
    let stranger = app.user().await;
    mount_confirm(&app).await;

    create_order(&app, &owner.token, "order_0001", 9900).await;
    app.server
        .get("/api/payments/toss/success")
        .add_query_param("paymentKey", "pk_1")
        .add_query_param("orderId", "order_0001")
        .add_query_param("amount", 9900)
        .await
        .assert_status_ok();

    Mock::given(method("POST"))
        .and(path("/toss/v1/payments/pk_1/cancel"))
        .and(body_json(json!({"cancelReason": "변심"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cancels": [{"cancelAmount": 9900, "cancelReason": "변심"}]
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let forbidden = app
        .server
        .post("/api/payments/toss/cancel")
        .authorization_bearer(&stranger.token)
        .json(&json!({"paymentKey": "pk_1", "cancelReason": "변심"}))
        .await;
    assert_error(&forbidden, StatusCode::FORBIDDEN);

    let unknown = app
        .server
        .post("/api/payments/toss/cancel")
        .authorization_bearer(&owner.token)
        .json(&json!({"paymentKey": "pk_404", "cancelReason": "변심"}))
        .await;
    assert_error(&unknown, StatusCode::NOT_FOUND);

    let canceled = app
        .server
        .post("/api/payments/toss/cancel")
        .authorization_bearer(&owner.token)
        .json(&json!({"paymentKey": "pk_1", "cancelReason": "변심"}))
        .await;
    assert_eq!(canceled.status_code(), StatusCode::OK, "{}", canceled.text());
    let canceled: Value = canceled.json();
    assert_eq!(canceled["cancels"][0]["cancelAmount"], 9900);
}

#[tokio::test]
async fn test_billing_enrollment_and_charge() {
    let app = TestApp::spawn().await;
    let user = app.user().await;
    let stranger = app.user().await;

    let started = app
        .server
        .post("/api/payments/toss/billing/start")
        .authorization_bearer(&user.token)
        .json(&json!({"customer_key": "cust_1", "plan": "BASIC", "amount": 19900}))
        .await;
    assert_eq!(started.status_code(), StatusCode::OK, "{}", started.text());
    let started: Value = started.json();
    assert_eq!(
        started["successUrl"],
        "http://api.test/api/payments/toss/billing/auth-success"
    );

    Mock::given(method("POST"))
        .and(path("/toss/v1/billing/authorizations/issue"))
        .and(body_json(json!({"authKey": "auth_1", "customerKey": "cust_1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "billingKey": "bk_1",
            "customerKey": "cust_1"
        })))
        .mount(&app.upstream)
        .await;

    let enrolled = app
        .server
        .get("/api/payments/toss/billing/auth-success")
        .add_query_param("authKey", "auth_1")
        .add_query_param("customerKey", "cust_1")
        .await;
    assert_eq!(
        location(&enrolled),
        format!("{TEST_FRONT}/plans?billing_enrolled=1&customerKey=cust_1")
    );

    Mock::given(method("POST"))
        .and(path("/toss/v1/billing/bk_1"))
        .and(body_partial_json(json!({
            "customerKey": "cust_1",
            "amount": 19900,
            "orderName": "BASIC subscription monthly"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paymentKey": "pk_sub",
            "status": "DONE"
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let forbidden = app
        .server
        .post("/api/payments/toss/billing/charge-now")
        .authorization_bearer(&stranger.token)
        .json(&json!({"customer_key": "cust_1"}))
        .await;
    assert_error(&forbidden, StatusCode::FORBIDDEN);

    let charged = app
        .server
        .post("/api/payments/toss/billing/charge-now")
        .authorization_bearer(&user.token)
        .json(&json!({"customer_key": "cust_1"}))
        .await;
    assert_eq!(charged.status_code(), StatusCode::OK, "{}", charged.text());
    let charged: Value = charged.json();
    assert_eq!(charged["ok"], true);
    assert_eq!(charged["payment"]["status"], "DONE");
    assert!(charged["nextBillingAt"].is_string());
}

#[tokio::test]
async fn test_charge_now_without_billing_key() {
    let app = TestApp::spawn().await;
    let user = app.user().await;

    let response = app
        .server
        .post("/api/payments/toss/billing/charge-now")
        .authorization_bearer(&user.token)
        .json(&json!({"customer_key": "cust_unknown"}))
        .await;

    let body = assert_error(&response, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No billingKey for customerKey");
}

async fn start_billing(app: &TestApp, token: &str, amount: i64) -> TestResponse {
    app.server
        .post("/api/payments/toss/billing/start")
        .authorization_bearer(token)
        .json(&json!({"customer_key": "cust_owned", "plan": "PRO", "amount": amount}))
        .await
}

#[tokio::test]
async fn test_billing_start_keeps_existing_owner() {
    let app = TestApp::spawn().await;
    let owner = app.user().await;
    let other = app.user().await;

    start_billing(&app, &owner.token, 29000).await.assert_status_ok();
    let taken = start_billing(&app, &other.token, 100).await;
    assert_error(&taken, StatusCode::FORBIDDEN);

    let subscription = app
        .state
        .ledger
        .subscription("cust_owned")
        .await
        .expect("subscription");
    assert_eq!(subscription.amount, 29000);
    assert_eq!(subscription.user_id, Some(owner.id));

    // The owner can still change plans
    start_billing(&app, &owner.token, 39000).await.assert_status_ok();
}

#[tokio::test]
async fn test_billing_auth_fail_redirect() {
    let app = TestApp::spawn().await;

    let response = app
        .server
        .get("/api/payments/toss/billing/auth-fail")
        .add_query_param("errorCode", "USER_CANCEL")
        .add_query_param("errorMessage", "cancel")
        .await;

    assert_eq!(
        location(&response),
        format!("{TEST_FRONT}/plans?billing_enrolled=0&error=USER_CANCEL&msg=cancel")
    );
}
