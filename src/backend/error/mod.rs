//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in HTTP handlers and can be converted to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse and integration error conversions
//! ```
//!
//! # Error Types
//!
//! - `HandlerError` - Errors that occur in HTTP handlers
//! - `StateError` - Server misconfiguration
//! - `UpstreamError` - Third-party API failures (502)
//! - `DatabaseError` - sqlx failures
//! - `SharedError` - Errors from the shared module
//! - `SerializationError` - JSON serialization errors
//!
//! # HTTP Response Conversion
//!
//! All backend errors implement `IntoResponse` from Axum, allowing them to be
//! returned directly from handlers. Integration errors (`LlmError`,
//! `StorageError`, `InstagramError`, `TossError`, ...) convert into
//! `BackendError` through `?`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;

/// Result alias used by handlers
pub type ApiResult<T> = Result<T, BackendError>;
