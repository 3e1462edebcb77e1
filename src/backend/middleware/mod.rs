//! Middleware Module
//!
//! This module contains HTTP middleware and request extractors for the
//! backend server.
//!
//! - **`auth`** - Bearer-token authentication for protected routes, plus
//!   the `AuthUser` and `OptionalAuthUser` extractors
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use pium::backend::middleware::auth_middleware;
//! use pium::backend::server::AppState;
//!
//! # fn example(state: AppState) {
//! let protected: Router<AppState> = Router::new()
//!     .route("/api/auth/me", get(|| async { "me" }))
//!     .route_layer(from_fn_with_state(state, auth_middleware));
//! # }
//! ```

pub mod auth;

pub use auth::{auth_middleware, authenticate, extract_authenticated_user, AuthUser, AuthenticatedUser, OptionalAuthUser};
