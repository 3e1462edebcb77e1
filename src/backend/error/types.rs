/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler.
 *
 * # Error Types
 *
 * - `HandlerError` - Request-level failures carrying an explicit status
 * - `StateError` - Server-side misconfiguration (missing credentials, assets)
 * - `UpstreamError` - A third-party API failed or rejected the call
 * - `DatabaseError` - Query or connection failure
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Handler errors occur when processing HTTP requests:
 * - Invalid request body or query
 * - Authentication and ownership failures
 * - Missing entities
 *
 * ## Upstream Errors
 *
 * Upstream errors carry the name of the failing service and, when the
 * service answered with JSON, its error body. The body is forwarded to the
 * client so it can react to conditions like Instagram rate limits.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use pium::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// let err = BackendError::state("IG_ACCESS_TOKEN is not configured");
/// let err = BackendError::upstream("instagram", "media_publish failed", None);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., invalid body, not found, forbidden)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Server state error (e.g., credentials or assets missing)
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Third-party API failure
    #[error("Upstream error from {service}: {message}")]
    UpstreamError {
        /// Short service name (`openai`, `storage`, `instagram`, ...)
        service: &'static str,
        /// Human-readable error message
        message: String,
        /// Upstream JSON error body, if any
        detail: Option<serde_json::Value>,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Error message
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    ///
    /// # Arguments
    ///
    /// * `service` - Short name of the failing service
    /// * `message` - Error message
    /// * `detail` - Upstream JSON body, forwarded to the client
    pub fn upstream(
        service: &'static str,
        message: impl Into<String>,
        detail: Option<serde_json::Value>,
    ) -> Self {
        Self::UpstreamError {
            service,
            message: message.into(),
            detail,
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `StateError` - 500 Internal Server Error
    /// - `UpstreamError` - 502 Bad Gateway
    /// - `DatabaseError` - 500 Internal Server Error
    /// - `SharedError` - 400 for validation, 500 otherwise
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    ///
    /// Database errors are reported generically; the details only go to the log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StateError { message, .. } => message.clone(),
            Self::UpstreamError { service, message, .. } => format!("{service}: {message}"),
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }

    /// Upstream error body, if any
    pub fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            Self::UpstreamError { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}
