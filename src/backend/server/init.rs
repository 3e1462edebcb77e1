/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including database loading, admin seeding, state creation and route
 * configuration.
 *
 * # Initialization Process
 *
 * 1. Load the database (optional)
 * 2. Seed the administrator account when configured
 * 3. Create the application state and upstream clients
 * 4. Create and configure the router
 */

use axum::Router;

use crate::backend::auth::users::ensure_admin;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is resilient:
/// - Missing database: server continues without database features
/// - Admin seeding failure: logged, startup continues
pub async fn create_app(config: AppConfig) -> Router<()> {
    tracing::info!("Initializing Pium backend server");

    // Step 1: Load optional services
    let db_pool = load_database(&config).await;

    // Step 2: Seed the administrator account
    if let (Some(pool), Some(seed)) = (&db_pool, &config.admin) {
        match ensure_admin(pool, &seed.email, &seed.password).await {
            Ok(true) => tracing::info!("Administrator account created: {}", seed.email),
            Ok(false) => tracing::info!("Administrator account already present: {}", seed.email),
            Err(e) => tracing::error!("Failed to seed administrator account: {:?}", e),
        }
    }

    // Step 3: Create app state
    let app_state = AppState::new(config, db_pool);

    // Step 4: Create router with all routes
    let app = build_app(app_state);

    tracing::info!("Router configured");

    app
}

/// Build the router from an existing state
///
/// Used by `create_app` and by tests that assemble their own state.
pub fn build_app(app_state: AppState) -> Router<()> {
    create_router(app_state)
}
