/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Generate JWT token
 *
 * # Security
 *
 * - Unknown email and wrong password return the same 401 message
 * - Deactivated accounts are refused with 403
 */

use axum::{extract::{rejection::JsonRejection, State}, response::Json};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::server::state::{require_db, AppState};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - If user is not found or password is incorrect
/// * `403 Forbidden` - If the account is deactivated
/// * `503 Service Unavailable` - If database is not configured
///
/// # Example Request
///
/// ```http
/// POST /api/auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {"email": "cafe@example.com", "password": "securepassword123"}
/// ```
///
/// # Example Response
///
/// ```json
/// {"user_id": 1, "access_token": "eyJhbGciOi...", "token_type": "bearer"}
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let pool = require_db(state.db_pool.clone())?;
    let email = request.email.trim().to_lowercase();
    tracing::info!("Login request for: {}", email);

    let user = get_user_by_email(&pool, &email).await?.ok_or_else(|| {
        tracing::warn!("User not found: {}", email);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        BackendError::state("Password verification failed")
    })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", email);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    if !user.is_active {
        tracing::warn!("Login attempt for inactive user: {}", email);
        return Err(BackendError::forbidden("Account is inactive"));
    }

    let token = create_token(user.id, user.email.clone()).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::state("Failed to create token")
    })?;

    tracing::info!("User logged in successfully: {} ({})", user.id, user.email);

    Ok(Json(AuthResponse::bearer(user.id, token)))
}
