/**
 * Session Management and JWT Tokens
 *
 * This module handles JWT token generation and validation for user sessions.
 * Tokens are HS256-signed with `JWT_SECRET` and expire after
 * `JWT_EXPIRE_MINUTES` (default 60).
 */

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default token lifetime in minutes
pub const DEFAULT_EXPIRE_MINUTES: i64 = 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Get JWT secret from environment
fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set, using development secret");
        "change-me-in-prod".to_string()
    })
}

/// Token lifetime from `JWT_EXPIRE_MINUTES`
fn get_expire_minutes() -> i64 {
    std::env::var("JWT_EXPIRE_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_EXPIRE_MINUTES)
}

/// Expiry timestamp `minutes` after `now`, saturating at `u64::MAX`
fn expires_at(now: u64, minutes: i64) -> u64 {
    now.saturating_add(minutes.max(0).unsigned_abs().saturating_mul(60))
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `user_id` - User ID
/// * `email` - User email
///
/// # Returns
/// JWT token string
pub fn create_token(user_id: i64, email: String) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as u64;
    let exp = expires_at(now, get_expire_minutes());

    let claims = Claims {
        sub: user_id.to_string(),
        email,
        exp,
        iat: now,
    };

    let secret = get_jwt_secret();
    let key = EncodingKey::from_secret(secret.as_ref());

    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
///
/// # Returns
/// Decoded claims or error (bad signature, malformed, expired)
pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = get_jwt_secret();
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}
