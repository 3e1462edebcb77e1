//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! └── me.rs        - Get current user handler
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register - Registration with business verification
//! - **`login`** - POST /api/auth/login - User authentication
//! - **`get_me`** - GET /api/auth/me - Get current user info
//!
//! # Example
//!
//! ```rust,no_run
//! use pium::backend::auth::handlers::{register, login, get_me};
//! use pium::backend::server::AppState;
//! use axum::{routing::post, routing::get, Router};
//!
//! # fn example() {
//! let router: Router<AppState> = Router::new()
//!     .route("/api/auth/register", post(register))
//!     .route("/api/auth/login", post(login))
//!     .route("/api/auth/me", get(get_me));
//! # }
//! ```

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

pub use types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

pub use login::login;
pub use me::get_me;
pub use register::register;
