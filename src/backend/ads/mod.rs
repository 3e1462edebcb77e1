//! Ad Copy Module
//!
//! Generates Instagram captions for a store brief and keeps track of which
//! caption the user picked.
//!
//! # Module Structure
//!
//! ```text
//! ads/
//! ├── mod.rs       - Module exports
//! ├── prompt.rs    - Prompt text for a brief
//! ├── llm.rs       - Chat-completions client
//! ├── parser.rs    - Model output to caption variants
//! ├── repo.rs      - Requests, variants and selections
//! └── handlers.rs  - HTTP handlers
//! ```

pub mod prompt;

pub mod llm;

pub mod parser;

pub mod repo;

pub mod handlers;

pub use handlers::{choice, choose, generate, latest_request};
pub use llm::{LlmClient, LlmError};
pub use parser::{parse_variants, ParsedVariant};
