//! Shared Module
//!
//! This module contains plain data types and errors that do not depend on the
//! HTTP server: the generation brief, runtime configuration and the shared
//! error enum. Everything here is `Serialize`/`Deserialize` or pure logic so
//! it can be unit-tested without a runtime.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Caption generation brief
pub mod ad_brief;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use config::{AppConfig, ConfigError};
pub use ad_brief::{BusinessHours, GenerateAdRequest, Tone};
