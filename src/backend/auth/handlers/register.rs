/**
 * Register Handler
 *
 * This module implements the user registration handler for POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate email format and password length
 * 2. Check if user already exists
 * 3. Verify the business registration with the tax service
 * 4. Hash password using bcrypt
 * 5. Create user in database
 * 6. Generate JWT token
 *
 * # Validation
 *
 * - Email must look like `local@domain`
 * - Password must be at least 8 characters long
 * - Business number, opening date and representative name are required
 */

use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, response::Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::backend::auth::business::VerificationOutcome;
use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_email, is_unique_violation, NewUser};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::server::state::{require_db, AppState};

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Basic email shape check: one `@`, non-empty local part, dotted domain
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

fn required<'a>(value: &'a Option<String>, field: &str) -> ApiResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackendError::bad_request(format!("{field} is required")))
}

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - Invalid email or password, duplicate email, missing
///   business fields or failed business verification
/// * `503 Service Unavailable` - If database is not configured
/// * `500 Internal Server Error` - If hashing or token generation fails
///
/// # Example Request
///
/// ```http
/// POST /api/auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "email": "cafe@example.com",
///   "password": "securepassword123",
///   "business_registration_number": "123-45-67890",
///   "start_dt": "2020-03-01",
///   "p_nm": "홍길동"
/// }
/// ```
///
/// # Example Response (201)
///
/// ```json
/// {"user_id": 1, "access_token": "eyJhbGciOi...", "token_type": "bearer"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let pool = require_db(state.db_pool.clone())?;
    let email = request.email.trim().to_lowercase();

    if !is_valid_email(&email) {
        tracing::warn!("Invalid email format: {}", email);
        return Err(BackendError::bad_request("Invalid email format"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackendError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if get_user_by_email(&pool, &email).await?.is_some() {
        tracing::warn!("Registration for existing email: {}", email);
        return Err(BackendError::bad_request("Email already in use"));
    }

    let number = required(&request.business_registration_number, "business_registration_number")?;
    let opening_date = required(&request.start_dt, "start_dt")?;
    let representative = required(&request.p_nm, "p_nm")?;

    let (identity, outcome) = state
        .verifier
        .verify(number, opening_date, representative)
        .await?;
    if outcome == VerificationOutcome::Skipped {
        tracing::info!("Business verification skipped for {}", email);
    }

    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::state("Failed to hash password")
    })?;

    let user = create_user(
        &pool,
        NewUser {
            email: email.clone(),
            password_hash,
            business_registration_number: Some(identity.b_no),
            representative_name: Some(identity.p_nm),
            opening_date: Some(identity.start_dt),
            is_admin: false,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            BackendError::bad_request("Email already in use")
        } else {
            BackendError::from(e)
        }
    })?;

    let token = create_token(user.id, user.email.clone()).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::state("Failed to create token")
    })?;

    tracing::info!("User registered: {} ({})", user.id, user.email);

    Ok((StatusCode::CREATED, Json(AuthResponse::bearer(user.id, token))))
}
