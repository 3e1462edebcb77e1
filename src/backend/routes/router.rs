/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Layers
 *
 * - Request body limit sized for multi-file uploads
 * - Permissive CORS for the web frontend
 * - `TraceLayer` request spans
 */

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Maximum request body size
pub const MAX_BODY_BYTES: usize = 60 * 1024 * 1024;

async fn root() -> Json<Value> {
    Json(json!({"message": "Welcome to the Pium API"}))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

async fn not_found() -> BackendError {
    BackendError::not_found("Not Found")
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Configuration, database pool and upstream clients
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health));

    // Add API routes
    let router = configure_api_routes(router, &app_state);

    // JSON 404 for unknown routes
    let router = router.fallback(not_found);

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
