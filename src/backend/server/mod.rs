//! Server Module
//!
//! This module contains the server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Database loading
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # State Management
//!
//! The server uses `AppState` as the central state container, which holds
//! the configuration, the optional database pool, the upstream API clients
//! and the in-memory payment ledger.
//!
//! # Initialization Flow
//!
//! 1. **Database**: connect and migrate, or continue without a database
//! 2. **Admin Seed**: create the administrator account when configured
//! 3. **State Creation**: build upstream clients
//! 4. **Router Creation**: configure all routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use pium::backend::server::create_app;
//! use pium::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::from_env()?).await;
//! # Ok(())
//! # }
//! ```

/// Application state
pub mod state;

/// Database configuration
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, build_app};
pub use state::AppState;
