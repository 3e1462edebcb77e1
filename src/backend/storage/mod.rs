//! Object Storage Module
//!
//! Uploads images to an S3-compatible bucket and hands out presigned GET
//! URLs for them. Every image the service works with (user uploads, card
//! backgrounds, composed cards, inquiry attachments) lives in the bucket and
//! is addressed by its object key.
//!
//! # Module Structure
//!
//! ```text
//! storage/
//! ├── mod.rs          - Module exports and StorageError
//! ├── sigv4.rs        - AWS Signature V4 signing and presigning
//! ├── object_store.rs - PUT / GET / presign client
//! └── handlers.rs     - Upload and presigned-get endpoints
//! ```

/// AWS Signature V4
pub mod sigv4;

/// S3-compatible client
pub mod object_store;

/// HTTP handlers
pub mod handlers;

pub use object_store::ObjectStore;
pub use handlers::{upload_files, presigned_get};

use thiserror::Error;

/// Object storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage credentials are not configured")]
    MissingCredentials,

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Signing(#[from] sigv4::SigningError),

    #[error("object store returned HTTP {status} for {key}")]
    Http {
        status: u16,
        key: String,
        body: String,
    },

    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
