//! Card Composition Module
//!
//! Renders the Instagram card: background, two-line title and the store
//! photo, encoded as JPEG and uploaded to object storage.
//!
//! ```text
//! compose/
//! ├── mod.rs       - Errors and exports
//! ├── layout.rs    - Fixed geometry
//! ├── render.rs    - Decoding, resizing, text and encoding
//! └── handlers.rs  - POST /api/compose/card
//! ```

use thiserror::Error;

pub mod layout;

pub mod render;

pub mod handlers;

pub use handlers::{compose_card, render_and_store, ComposeCardRequest, ComposedCard};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("card font unavailable: {0}")]
    Font(String),
    #[error("cannot decode image: {0}")]
    Decode(image::ImageError),
    #[error("cannot encode card: {0}")]
    Encode(image::ImageError),
    #[error("composition task failed: {0}")]
    Join(String),
}
