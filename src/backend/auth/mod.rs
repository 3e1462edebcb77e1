//! Authentication Module
//!
//! This module handles user registration, login and session tokens.
//!
//! # Architecture
//!
//! - **`users`** - User data model and database operations
//! - **`sessions`** - JWT token generation and validation
//! - **`business`** - Business registration check against the tax service
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register**: email, password and business details → business verified → user created → JWT returned
//! 2. **Login**: email and password → credentials verified → JWT returned
//! 3. **Me**: JWT → middleware verifies token → user info returned
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens are HS256 JWTs expiring after `JWT_EXPIRE_MINUTES`
//! - Invalid credentials return 401 without revealing which part was wrong

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Business registration verification
pub mod business;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use business::{BusinessVerifier, VerificationError};
pub use handlers::types::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
pub use handlers::{get_me, login, register};
