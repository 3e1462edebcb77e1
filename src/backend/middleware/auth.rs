/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It extracts and verifies JWT tokens from the
 * Authorization header and provides the user to handlers.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::sessions::verify_token;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::{require_db, AppState};

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
}

/// Resolve the bearer token in `headers` to an active user
///
/// Returns 401 if the header is missing or malformed, the token is invalid
/// or expired, or the user no longer exists or is inactive.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, BackendError> {
    // Get Authorization header
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            BackendError::unauthorized("Not authenticated")
        })?;

    // Extract token (format: "Bearer <token>")
    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::warn!("Invalid Authorization header format");
            BackendError::unauthorized("Invalid authorization header")
        })?;

    let claims = verify_token(token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims.sub.parse::<i64>().map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Invalid token subject")
    })?;

    let pool = require_db(state.db_pool.clone())?;
    let user = get_user_by_id(&pool, user_id).await?.ok_or_else(|| {
        tracing::warn!("User not found in database: {}", user_id);
        BackendError::unauthorized("User not found")
    })?;

    if !user.is_active {
        tracing::warn!("Inactive user rejected: {}", user_id);
        return Err(BackendError::unauthorized("User is inactive"));
    }

    Ok(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        is_admin: user.is_admin,
    })
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts JWT token from Authorization header
/// 2. Verifies the token and loads the user
/// 3. Attaches user data to request extensions for use in handlers
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = authenticate(&app_state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extract authenticated user from request extensions
///
/// This is a helper function for handlers to get the authenticated user
/// that was set by the auth middleware.
pub fn extract_authenticated_user(parts: &Parts) -> Result<AuthenticatedUser, BackendError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("AuthenticatedUser not found in request extensions");
            BackendError::unauthorized("Not authenticated")
        })
}

/// Axum extractor for authenticated user
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_authenticated_user(parts).map(AuthUser)
    }
}

/// Extractor for routes where login is optional
///
/// No Authorization header yields `None`; a header that fails verification
/// is still rejected with 401.
#[derive(Clone, Debug)]
pub struct OptionalAuthUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(OptionalAuthUser(Some(user.clone())));
        }
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuthUser(None));
        }
        authenticate(state, &parts.headers)
            .await
            .map(|user| OptionalAuthUser(Some(user)))
    }
}
