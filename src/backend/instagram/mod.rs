//! Instagram Module
//!
//! Publishing through the Instagram Graph API.
//!
//! ```text
//! instagram/
//! ├── mod.rs       - Graph errors and exports
//! ├── client.rs    - Containers, publish, rate-limit fallback, collaborators
//! └── handlers.rs  - POST /api/ig/publish, GET /api/instagram/latest-post
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod client;

pub mod handlers;

pub use client::{InstagramClient, LatestMedia, PublishOutcome, PublishPlan, MAX_CAROUSEL_ITEMS};
pub use handlers::{latest_post, normalize_collaborators, publish};

/// Error codes the Graph API uses for throttling
const RATE_LIMIT_CODES: [i64; 4] = [4, 17, 32, 613];
/// "Application request limit reached" on content publishing
const RATE_LIMIT_SUBCODE: i64 = 2207051;

/// The `error` object of a Graph API response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

impl GraphError {
    /// Extract the error object from a response body
    pub fn from_body(body: &Value) -> Self {
        match body.get("error") {
            Some(error) => serde_json::from_value(error.clone()).unwrap_or_else(|_| GraphError {
                message: error.to_string(),
                ..Default::default()
            }),
            None => GraphError {
                message: match body {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                },
                ..Default::default()
            },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        if self.code.is_some_and(|c| RATE_LIMIT_CODES.contains(&c)) {
            return true;
        }
        if self.error_subcode == Some(RATE_LIMIT_SUBCODE) {
            return true;
        }
        let message = self.message.to_lowercase();
        message.contains("application request limit") || message.contains("rate limit")
    }
}

#[derive(Debug, Error)]
pub enum InstagramError {
    #[error("Instagram credentials are not configured")]
    MissingCredentials,
    #[error("no images to publish")]
    NoImages,
    #[error("{stage} failed with HTTP {status}: {}", .error.message)]
    Graph {
        stage: &'static str,
        status: u16,
        error: GraphError,
        body: Value,
    },
    #[error("{stage} response has no id")]
    MissingId { stage: &'static str },
    #[error("cannot encode request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl InstagramError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InstagramError::Graph { error, .. } if error.is_rate_limited())
    }
}
