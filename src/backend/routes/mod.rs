//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, layers and fallback
//! └── api_routes.rs   - Public and authenticated API endpoints
//! ```
//!
//! # Route Organization
//!
//! 1. **Service Routes** - `/` welcome message, `/health`
//! 2. **API Routes** - public group, then the group behind `auth_middleware`
//! 3. **Fallback Handler** - JSON 404
//!
//! # Example
//!
//! ```rust,no_run
//! use pium::backend::routes::create_router;
//! use pium::backend::server::state::AppState;
//! use pium::shared::AppConfig;
//!
//! let router = create_router(AppState::new(AppConfig::default(), None));
//! ```

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
