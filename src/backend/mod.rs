//! Backend Module
//!
//! All server-side code for the Pium API: an Axum HTTP server that turns a
//! store brief into Instagram posts.
//!
//! # Overview
//!
//! - Caption generation through a chat-completions model, with persisted
//!   requests, variants and the user's pick
//! - Card image composition and S3-compatible object storage
//! - Instagram Graph API publishing (single image or carousel)
//! - JWT authentication with business registration checks
//! - Toss Payments checkout and subscriptions
//! - Support inquiries with attachments
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Initialization, state, database
//! ├── routes/         - Route configuration
//! ├── middleware/     - Authentication middleware and extractors
//! ├── error/          - Backend error type and conversions
//! ├── auth/           - Users, JWT sessions, business verification
//! ├── ads/            - Prompting, LLM client, variant parsing, persistence
//! ├── storage/        - Object storage client and upload endpoints
//! ├── compose/        - Card rendering
//! ├── instagram/      - Graph API publishing
//! ├── pipeline/       - Choose, compose and publish in one call
//! ├── payments/       - Toss payments
//! └── inquiries/      - Support inquiries
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the configuration, the optional
//! SQLite pool, one client per upstream API and the in-memory payment
//! ledger. Without a database the server still starts; database-backed
//! endpoints answer 503.
//!
//! # Error Handling
//!
//! Every handler returns `ApiResult<T>`. Integration errors convert into
//! `BackendError` through `?`; upstream failures surface as 502 with the
//! upstream JSON error attached.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Middleware for request processing
pub mod middleware;

/// Authentication and user management
pub mod auth;

/// Caption generation
pub mod ads;

/// Object storage
pub mod storage;

/// Card composition
pub mod compose;

/// Instagram publishing
pub mod instagram;

/// Choose-and-publish pipeline
pub mod pipeline;

/// Toss payments
pub mod payments;

/// Support inquiries
pub mod inquiries;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, AppState};
