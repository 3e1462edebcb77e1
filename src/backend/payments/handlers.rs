/**
 * Toss Payment Handlers
 *
 * One-off payments:
 * - `POST /api/payments/toss/orders` - register an order before checkout
 * - `GET /api/payments/toss/success` - checkout success callback, confirms the payment
 * - `GET /api/payments/toss/fail` - checkout failure callback
 * - `POST /api/payments/toss/cancel` - cancel a paid order
 *
 * Subscriptions:
 * - `POST /api/payments/toss/billing/start` - register a pending subscription
 * - `GET /api/payments/toss/billing/auth-success` - card registered, issue the billing key
 * - `GET /api/payments/toss/billing/auth-fail` - card registration failed
 * - `POST /api/payments/toss/billing/charge-now` - charge a billing key immediately
 *
 * Callbacks are hit by the payment widget redirect and are public; they
 * answer with `303 See Other` towards the frontend where noted.
 */

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::payments::ledger::{OrderStatus, Subscription};
use crate::backend::server::state::AppState;

fn check_len(field: &str, value: &str, min: usize, max: usize) -> ApiResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(BackendError::bad_request(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn check_positive(field: &str, value: i64) -> ApiResult<()> {
    if value <= 0 {
        return Err(BackendError::bad_request(format!("{field} must be greater than 0")));
    }
    Ok(())
}

/// `303 See Other` to `{FRONT_BASE_URL}/plans?{params}`
fn plans_redirect(state: &AppState, params: &[(&str, &str)]) -> ApiResult<Redirect> {
    let base = format!("{}/plans", state.config.server.front_base_url.trim_end_matches('/'));
    let url = reqwest::Url::parse_with_params(&base, params)
        .map_err(|e| BackendError::state(format!("Invalid FRONT_BASE_URL: {e}")))?;
    Ok(Redirect::to(url.as_str()))
}

fn callback_url(state: &AppState, path: &str) -> String {
    format!(
        "{}/api/payments/toss/{}",
        state.config.server.base_url.trim_end_matches('/'),
        path
    )
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub amount: i64,
    pub order_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub ok: bool,
    pub order_id: String,
    pub amount: i64,
    pub order_name: String,
    pub success_url: String,
    pub fail_url: String,
}

/// Register an order
///
/// The amount is stored so the success callback can detect tampering.
pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderCreated>)> {
    let Json(request) = payload?;
    check_len("order_id", &request.order_id, 6, 64)?;
    check_positive("amount", request.amount)?;
    check_len("order_name", &request.order_name, 0, 100)?;

    state
        .ledger
        .create_order(&request.order_id, request.amount, &request.order_name, Some(user.user_id))
        .await;
    tracing::info!(
        "Order {} created by user {} ({} KRW)",
        request.order_id,
        user.user_id,
        request.amount
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            ok: true,
            order_id: request.order_id,
            amount: request.amount,
            order_name: request.order_name,
            success_url: callback_url(&state, "success"),
            fail_url: callback_url(&state, "fail"),
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessQuery {
    pub payment_key: String,
    pub order_id: String,
    pub amount: i64,
}

/// Checkout success callback
///
/// # Errors
///
/// * `404 Not Found` - Unknown order
/// * `400 Bad Request` - Amount differs from the registered order, or Toss refused the confirmation
pub async fn payment_success(
    State(state): State<AppState>,
    Query(query): Query<SuccessQuery>,
) -> ApiResult<Json<Value>> {
    let order = state
        .ledger
        .order(&query.order_id)
        .await
        .ok_or_else(|| BackendError::not_found("Unknown orderId"))?;

    // Repeated callbacks report the current state
    if order.status != OrderStatus::Ready {
        return Ok(Json(json!({"ok": true, "orderId": order.order_id, "status": order.status})));
    }
    if order.amount != query.amount {
        tracing::warn!(
            "Amount mismatch for order {}: expected {}, got {}",
            order.order_id,
            order.amount,
            query.amount
        );
        return Err(BackendError::bad_request("Amount mismatch"));
    }

    let data = state
        .toss
        .confirm_payment(&query.payment_key, &query.order_id, query.amount)
        .await?;
    state.ledger.mark_paid(&query.order_id, &query.payment_key).await;
    tracing::info!("Order {} paid", query.order_id);

    Ok(Json(json!({
        "ok": true,
        "orderId": query.order_id,
        "status": OrderStatus::Paid,
        "method": data.get("method"),
        "approvedAt": data.get("approvedAt"),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailQuery {
    pub code: Option<String>,
    pub message: Option<String>,
    pub order_id: Option<String>,
}

/// Checkout failure callback
pub async fn payment_fail(
    State(state): State<AppState>,
    Query(query): Query<FailQuery>,
) -> ApiResult<Redirect> {
    tracing::info!(
        "Checkout failed for order {:?}: {:?}",
        query.order_id,
        query.code
    );
    plans_redirect(
        &state,
        &[
            ("payment", "fail"),
            ("code", query.code.as_deref().unwrap_or_default()),
            ("message", query.message.as_deref().unwrap_or_default()),
        ],
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub payment_key: String,
    pub cancel_reason: String,
    #[serde(default)]
    pub cancel_amount: Option<i64>,
}

/// Cancel a paid order, fully or partially
pub async fn cancel_payment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    check_len("cancelReason", &request.cancel_reason, 0, 200)?;
    if let Some(amount) = request.cancel_amount {
        check_positive("cancelAmount", amount)?;
    }

    let order = state
        .ledger
        .order_by_payment_key(&request.payment_key)
        .await
        .ok_or_else(|| BackendError::not_found("Payment not found"))?;
    if order.user_id.is_some_and(|owner| owner != user.user_id) {
        return Err(BackendError::forbidden("Not your payment"));
    }

    let data = state
        .toss
        .cancel_payment(&request.payment_key, &request.cancel_reason, request.cancel_amount)
        .await?;
    state.ledger.mark_canceled(&order.order_id).await;
    tracing::info!("Order {} canceled by user {}", order.order_id, user.user_id);

    Ok(Json(json!({"ok": true, "cancels": data.get("cancels")})))
}

#[derive(Debug, Deserialize)]
pub struct StartBillingRequest {
    pub customer_key: String,
    pub plan: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingStarted {
    pub ok: bool,
    pub success_url: String,
    pub fail_url: String,
}

/// Register a pending monthly subscription before card registration
///
/// # Errors
///
/// * `400 Bad Request` - Invalid customer key, plan or amount
/// * `403 Forbidden` - Customer key registered by another user
pub async fn billing_start(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<StartBillingRequest>, JsonRejection>,
) -> ApiResult<Json<BillingStarted>> {
    let Json(request) = payload?;
    check_len("customer_key", &request.customer_key, 3, 100)?;
    check_len("plan", &request.plan, 0, 20)?;
    check_positive("amount", request.amount)?;

    state
        .ledger
        .put_subscription(
            &request.customer_key,
            Subscription::monthly(&request.plan, request.amount, Some(user.user_id)),
        )
        .await
        .map_err(|owner| {
            tracing::warn!(
                "User {} tried to take over customer key {} of user {}",
                user.user_id,
                request.customer_key,
                owner
            );
            BackendError::forbidden("customerKey belongs to another user")
        })?;

    Ok(Json(BillingStarted {
        ok: true,
        success_url: callback_url(&state, "billing/auth-success"),
        fail_url: callback_url(&state, "billing/auth-fail"),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSuccessQuery {
    pub auth_key: String,
    pub customer_key: String,
}

/// Card registration succeeded: exchange the auth key for a billing key
pub async fn billing_auth_success(
    State(state): State<AppState>,
    Query(query): Query<AuthSuccessQuery>,
) -> ApiResult<Redirect> {
    let data = state
        .toss
        .issue_billing_key(&query.auth_key, &query.customer_key)
        .await?;
    let billing_key = data
        .get("billingKey")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "billingKey missing")
        })?;

    let subscription = state
        .ledger
        .enroll_billing(&query.customer_key, billing_key, Utc::now())
        .await;
    tracing::info!(
        "Billing key issued for {} (plan {})",
        query.customer_key,
        subscription.plan
    );

    plans_redirect(
        &state,
        &[("billing_enrolled", "1"), ("customerKey", query.customer_key.as_str())],
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthFailQuery {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Card registration failed
pub async fn billing_auth_fail(
    State(state): State<AppState>,
    Query(query): Query<AuthFailQuery>,
) -> ApiResult<Redirect> {
    plans_redirect(
        &state,
        &[
            ("billing_enrolled", "0"),
            ("error", query.error_code.as_deref().unwrap_or_default()),
            ("msg", query.error_message.as_deref().unwrap_or_default()),
        ],
    )
}

#[derive(Debug, Deserialize)]
pub struct ChargeNowRequest {
    pub customer_key: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResult {
    pub ok: bool,
    pub payment: Value,
    pub next_billing_at: Option<DateTime<Utc>>,
}

/// Charge a registered billing key now
///
/// # Errors
///
/// * `404 Not Found` - No billing key or no subscription for the customer key
/// * `403 Forbidden` - Billing key registered by another user
/// * `400 Bad Request` - Invalid amount, or Toss refused the charge
pub async fn charge_now(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ChargeNowRequest>, JsonRejection>,
) -> ApiResult<Json<ChargeResult>> {
    let Json(request) = payload?;
    if let Some(amount) = request.amount {
        check_positive("amount", amount)?;
    }

    let billing = state
        .ledger
        .billing(&request.customer_key)
        .await
        .ok_or_else(|| BackendError::not_found("No billingKey for customerKey"))?;
    let subscription = state
        .ledger
        .subscription(&request.customer_key)
        .await
        .ok_or_else(|| BackendError::not_found("No subscription for customerKey"))?;
    if billing.user_id.is_some_and(|owner| owner != user.user_id) {
        return Err(BackendError::forbidden("Not your billing key"));
    }

    let amount = request.amount.unwrap_or(subscription.amount);
    check_positive("amount", amount)?;
    let now = Utc::now();
    let order_id = request
        .order_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("SUBS_{}_{}", request.customer_key, now.timestamp()));

    let payment = state
        .toss
        .charge_billing_key(
            &billing.billing_key,
            &request.customer_key,
            amount,
            &order_id,
            &format!("{} subscription monthly", subscription.plan),
        )
        .await?;
    let next_billing_at = state.ledger.advance_billing(&request.customer_key, now).await;
    tracing::info!("Charged {} KRW to {} ({})", amount, request.customer_key, order_id);

    Ok(Json(ChargeResult {
        ok: true,
        payment,
        next_billing_at,
    }))
}
