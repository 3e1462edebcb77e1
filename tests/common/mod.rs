//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Database test fixtures
//! - Mock upstream servers
//! - Authentication test helpers
//! - Custom assertion macros
#![allow(dead_code)]

pub mod app;
pub mod assertions;
pub mod mock_server;

// Re-export commonly used utilities
pub use app::*;
pub use assertions::assert_error;
pub use auth_helpers::*;
pub use database::*;
pub use mock_server::*;
