/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The loaded configuration
 * - The optional SQLite pool
 * - One client per upstream API (LLM, object store, Instagram, Toss, NTS)
 * - The in-memory payment ledger
 *
 * # Thread Safety
 *
 * Every field is cheap to clone. Clients share one `reqwest::Client`
 * connection pool; the ledger wraps its maps in `Arc<RwLock<..>>`.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow handlers to extract only the part of
 * the state they need, e.g. `State(store): State<ObjectStore>`.
 */

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::ads::llm::LlmClient;
use crate::backend::auth::business::BusinessVerifier;
use crate::backend::error::BackendError;
use crate::backend::instagram::InstagramClient;
use crate::backend::payments::ledger::PaymentLedger;
use crate::backend::payments::toss::TossClient;
use crate::backend::storage::ObjectStore;
use crate::shared::AppConfig;

/// Timeout applied to every upstream call
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Database connection pool, `None` when the database is unavailable
    pub db_pool: Option<SqlitePool>,
    /// Chat-completions client
    pub llm: LlmClient,
    /// Object storage client
    pub storage: ObjectStore,
    /// Instagram Graph API client
    pub instagram: InstagramClient,
    /// Toss payments client
    pub toss: TossClient,
    /// Business registration verifier
    pub verifier: BusinessVerifier,
    /// In-memory orders, subscriptions and billing keys
    pub ledger: PaymentLedger,
}

impl AppState {
    /// Build the state and its upstream clients from configuration
    pub fn new(config: AppConfig, db_pool: Option<SqlitePool>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            llm: LlmClient::new(http.clone(), config.openai.clone()),
            storage: ObjectStore::new(http.clone(), config.storage.clone()),
            instagram: InstagramClient::new(http.clone(), config.instagram.clone()),
            toss: TossClient::new(http.clone(), config.toss.clone()),
            verifier: BusinessVerifier::new(http, config.nts.clone()),
            ledger: PaymentLedger::default(),
            config: Arc::new(config),
            db_pool,
        }
    }
}

/// Unwrap an optional pool, answering 503 when the database is not configured
pub fn require_db(pool: Option<SqlitePool>) -> Result<SqlitePool, BackendError> {
    pool.ok_or_else(|| {
        tracing::error!("Database not configured");
        BackendError::handler(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Database not configured",
        )
    })
}

impl FromRef<AppState> for Option<SqlitePool> {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for LlmClient {
    fn from_ref(state: &AppState) -> Self {
        state.llm.clone()
    }
}

impl FromRef<AppState> for ObjectStore {
    fn from_ref(state: &AppState) -> Self {
        state.storage.clone()
    }
}

impl FromRef<AppState> for InstagramClient {
    fn from_ref(state: &AppState) -> Self {
        state.instagram.clone()
    }
}

impl FromRef<AppState> for TossClient {
    fn from_ref(state: &AppState) -> Self {
        state.toss.clone()
    }
}

impl FromRef<AppState> for BusinessVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl FromRef<AppState> for PaymentLedger {
    fn from_ref(state: &AppState) -> Self {
        state.ledger.clone()
    }
}
