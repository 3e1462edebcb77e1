/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Public
 * - `POST /api/auth/register`, `POST /api/auth/login`
 * - `POST /api/inquiries` - login optional
 * - Toss redirect callbacks under `/api/payments/toss/`
 *
 * ## Authenticated (Bearer JWT, checked by `auth_middleware`)
 * - `GET /api/auth/me`
 * - `POST /api/generate`, `POST /api/choose`, `GET /api/choice`, `GET /api/requests/latest`
 * - `POST /api/files/upload`, `GET /api/files/presigned-get`
 * - `POST /api/compose/card`
 * - `POST /api/ig/publish`, `GET /api/instagram/latest-post`
 * - `POST /api/choose-publish`
 * - `GET /api/inquiries`, `GET /api/inquiries/{id}`, `POST /api/inquiries/{id}/answer`
 * - Toss orders, cancel and billing endpoints
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::backend::ads::{choice, choose, generate, latest_request};
use crate::backend::auth::{get_me, login, register};
use crate::backend::compose::compose_card;
use crate::backend::inquiries::{answer_inquiry, create_inquiry, get_inquiry, list_inquiries};
use crate::backend::instagram::{latest_post, publish};
use crate::backend::middleware::auth_middleware;
use crate::backend::payments::{
    billing_auth_fail, billing_auth_success, billing_start, cancel_payment, charge_now,
    create_order, payment_fail, payment_success,
};
use crate::backend::pipeline::choose_publish;
use crate::backend::server::state::AppState;
use crate::backend::storage::{presigned_get, upload_files};

/// Routes reachable without a token
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/inquiries", post(create_inquiry))
        .route("/api/payments/toss/success", get(payment_success))
        .route("/api/payments/toss/fail", get(payment_fail))
        .route("/api/payments/toss/billing/auth-success", get(billing_auth_success))
        .route("/api/payments/toss/billing/auth-fail", get(billing_auth_fail))
}

/// Routes behind the authentication middleware
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        // Caption generation
        .route("/api/generate", post(generate))
        .route("/api/choose", post(choose))
        .route("/api/choice", get(choice))
        .route("/api/requests/latest", get(latest_request))
        // Object storage
        .route("/api/files/upload", post(upload_files))
        .route("/api/files/presigned-get", get(presigned_get))
        // Card and publishing
        .route("/api/compose/card", post(compose_card))
        .route("/api/ig/publish", post(publish))
        .route("/api/instagram/latest-post", get(latest_post))
        .route("/api/choose-publish", post(choose_publish))
        // Inquiries
        .route("/api/inquiries", get(list_inquiries))
        .route("/api/inquiries/{id}", get(get_inquiry))
        .route("/api/inquiries/{id}/answer", post(answer_inquiry))
        // Payments
        .route("/api/payments/toss/orders", post(create_order))
        .route("/api/payments/toss/cancel", post(cancel_payment))
        .route("/api/payments/toss/billing/start", post(billing_start))
        .route("/api/payments/toss/billing/charge-now", post(charge_now))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

/// Configure API routes
///
/// `route_layer` only wraps matched routes, so unknown paths still reach
/// the fallback instead of answering 401.
pub fn configure_api_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .merge(public_routes())
        .merge(protected_routes(state))
}
