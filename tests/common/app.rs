//! Test application fixture
//!
//! Builds the full router the way `create_app` does, but over an in-memory
//! database and a wiremock upstream.

use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use wiremock::MockServer;

use pium::backend::server::{build_app, AppState};
use pium::shared::AppConfig;

use super::auth_helpers::{create_admin_user, create_unique_test_user, TestUser};
use super::database::create_test_pool;
use super::mock_server::test_config;

/// Running application plus handles on its collaborators
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub upstream: MockServer,
    pub state: AppState,
}

impl TestApp {
    /// Start an application with a fresh database and upstream mock
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Start an application after adjusting the test configuration
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let upstream = MockServer::start().await;
        let pool = create_test_pool().await;
        let mut config = test_config(&upstream.uri());
        configure(&mut config);
        let state = AppState::new(config, Some(pool.clone()));
        let server = TestServer::new(build_app(state.clone())).expect("Failed to start test server");

        Self {
            server,
            pool,
            upstream,
            state,
        }
    }

    /// Start an application whose database is not configured
    pub async fn spawn_without_database() -> Self {
        let upstream = MockServer::start().await;
        let pool = create_test_pool().await;
        let state = AppState::new(test_config(&upstream.uri()), None);
        let server = TestServer::new(build_app(state.clone())).expect("Failed to start test server");

        Self {
            server,
            pool,
            upstream,
            state,
        }
    }

    pub async fn user(&self) -> TestUser {
        create_unique_test_user(&self.pool).await
    }

    pub async fn admin(&self) -> TestUser {
        create_admin_user(&self.pool).await
    }
}

/// A valid generation brief
pub fn sample_brief() -> Value {
    json!({
        "store_name": "피움카페",
        "area_keywords": ["성동구", "성수동"],
        "address": "서울 성동구 성수이로 1",
        "price": "아메리카노 4,500원",
        "business_hours": {"open": "09:00", "close": "21:00"},
        "category": "카페",
        "store_intro": "직접 로스팅한 원두로 내리는 동네 카페",
        "tone": "professional",
        "num_variants": 3
    })
}
