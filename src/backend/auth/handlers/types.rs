/**
 * Authentication Handler Types
 *
 * This module defines the request and response types used by authentication handlers.
 * These types are shared across register, login, and get_me handlers.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::users::User;

/// Registration request
///
/// Business fields are checked against the tax service before the account
/// is created.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RegisterRequest {
    /// User's email address
    pub email: String,
    /// User's password (will be hashed before storage)
    pub password: String,
    /// Business registration number, with or without hyphens
    #[serde(default)]
    pub business_registration_number: Option<String>,
    /// Opening date, `YYYY-MM-DD` or `YYYYMMDD`
    #[serde(default)]
    pub start_dt: Option<String>,
    /// Representative name
    #[serde(default)]
    pub p_nm: Option<String>,
}

/// Login request
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response
///
/// Returned by register and login handlers.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub user_id: i64,
    /// JWT for the `Authorization: Bearer` header
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
}

impl AuthResponse {
    pub fn bearer(user_id: i64, access_token: String) -> Self {
        Self {
            user_id,
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// User response (without sensitive data)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub business_registration_number: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
            is_admin: user.is_admin,
            business_registration_number: user.business_registration_number,
        }
    }
}
