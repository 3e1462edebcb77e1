//! Pium - Main Library
//!
//! Pium is an ad-copy backend for small stores: it writes Instagram captions
//! from a store brief with a chat-completions model, renders a card image,
//! and publishes card and photos to Instagram.
//!
//! # Module Structure
//!
//! - **`shared`** - Types without server dependencies
//!   - Generation brief and tone
//!   - Runtime configuration
//!   - Error types
//!
//! - **`backend`** - Axum HTTP server
//!   - Authentication, caption generation, object storage
//!   - Card composition and Instagram publishing
//!   - Toss payments and support inquiries
//!
//! # Usage
//!
//! ```rust,no_run
//! use pium::backend::server::init::create_app;
//! use pium::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for brief validation
//! - `backend::BackendError` for everything an HTTP handler can return

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
