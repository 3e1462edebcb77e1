/**
 * Error Conversion
 *
 * This module provides conversion implementations for backend errors:
 * the `IntoResponse` impl used by every handler and the `From` impls that
 * lift per-integration errors (LLM, storage, Instagram, Toss, business
 * verification, card composition) into `BackendError`.
 *
 * # Response Format
 *
 * Error responses are returned as JSON with the following structure:
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 502,
 *   "upstream": { "error": { "code": 4, "message": "..." } }
 * }
 * ```
 * `upstream` is only present when a third-party API answered with a JSON
 * error body.
 */

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    response::{Response, IntoResponse},
    http::StatusCode,
    Json,
};
use crate::backend::ads::llm::LlmError;
use crate::backend::auth::business::VerificationError;
use crate::backend::compose::ComposeError;
use crate::backend::error::types::BackendError;
use crate::backend::instagram::InstagramError;
use crate::backend::payments::toss::TossError;
use crate::backend::storage::StorageError;

impl IntoResponse for BackendError {
    /// Convert a backend error into an HTTP response
    ///
    /// Server-side failures are logged at error level, client errors at
    /// warn level.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        let mut body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });
        if let Some(detail) = self.detail() {
            body["upstream"] = detail.clone();
        }

        (status, Json(body)).into_response()
    }
}

impl From<MultipartError> for BackendError {
    fn from(err: MultipartError) -> Self {
        BackendError::handler(err.status(), err.body_text())
    }
}

/// Malformed or incomplete JSON bodies are client errors
impl From<JsonRejection> for BackendError {
    fn from(err: JsonRejection) -> Self {
        BackendError::bad_request(err.body_text())
    }
}

impl From<LlmError> for BackendError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => BackendError::state("OPENAI_API_KEY is not configured"),
            LlmError::Http { status, body } => BackendError::upstream(
                "openai",
                format!("HTTP {status}"),
                serde_json::from_str(&body).ok(),
            ),
            other => BackendError::upstream("openai", other.to_string(), None),
        }
    }
}

impl From<StorageError> for BackendError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingCredentials => {
                BackendError::state("Object storage credentials are not configured")
            }
            StorageError::InvalidKey(key) => {
                BackendError::bad_request(format!("Invalid object key: {key}"))
            }
            StorageError::Http { status, body, .. } if status == 404 => {
                tracing::debug!("storage 404: {}", body);
                BackendError::upstream("storage", "object not found", None)
            }
            other => BackendError::upstream("storage", other.to_string(), None),
        }
    }
}

impl From<InstagramError> for BackendError {
    fn from(err: InstagramError) -> Self {
        match err {
            InstagramError::MissingCredentials => {
                BackendError::state("IG_USER_ID / IG_ACCESS_TOKEN are not configured")
            }
            InstagramError::Graph { stage, error, body, .. } => BackendError::upstream(
                "instagram",
                format!("{stage} failed: {}", error.message),
                Some(body),
            ),
            other => BackendError::upstream("instagram", other.to_string(), None),
        }
    }
}

impl From<TossError> for BackendError {
    fn from(err: TossError) -> Self {
        match err {
            TossError::MissingSecretKey => BackendError::state("TOSS_SECRET_KEY is not configured"),
            TossError::Api { code, message, .. } => {
                BackendError::bad_request(format!("{code}: {message}"))
            }
            other => BackendError::upstream("toss", other.to_string(), None),
        }
    }
}

impl From<VerificationError> for BackendError {
    fn from(err: VerificationError) -> Self {
        BackendError::bad_request(format!("Business verification failed: {err}"))
    }
}

impl From<ComposeError> for BackendError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::Decode(_) => BackendError::bad_request(err.to_string()),
            _ => BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        }
    }
}
