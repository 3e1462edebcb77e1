/**
 * Ad Generation Handlers
 *
 * - `POST /api/generate` - generate caption variants for a brief
 * - `POST /api/choose` - pick one variant of the latest request
 * - `GET /api/choice` - current pick
 * - `GET /api/requests/latest` - latest request with its variants
 *
 * All routes require authentication.
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::ads::parser::{parse_variants, ParsedVariant};
use crate::backend::ads::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::backend::ads::repo::{self, AdSelection, AdVariantRecord};
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::{require_db, AppState};
use crate::shared::GenerateAdRequest;

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub request_id: i64,
    pub variants: Vec<ParsedVariant>,
}

/// Generate caption variants
///
/// # Errors
///
/// * `400 Bad Request` - Invalid brief
/// * `500 Internal Server Error` - OpenAI key not configured
/// * `502 Bad Gateway` - Model provider failed or rate limited twice
///
/// # Example Response
///
/// ```json
/// {
///   "request_id": 12,
///   "variants": [
///     {"id": "6f1c...", "content": "성수동 아침 커피 ☕\n\n#성수동 #카페", "hashtags": ["성수동", "카페"]}
///   ]
/// }
/// ```
pub async fn generate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<GenerateAdRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let Json(brief) = payload?;
    brief.validate()?;
    let pool = require_db(state.db_pool.clone())?;

    tracing::info!(
        "Generating {} captions for user {} ({})",
        brief.num_variants,
        user.user_id,
        brief.store_name
    );

    let prompt = build_prompt(&brief);
    let raw = state.llm.complete(SYSTEM_PROMPT, &prompt).await?;
    let variants = parse_variants(&raw, brief.num_variants as usize);
    tracing::debug!("Parsed {} variants", variants.len());

    let payload = serde_json::to_value(&brief)?;
    let request_id = repo::save_request_with_variants(&pool, user.user_id, &payload, &variants).await?;

    Ok(Json(GenerateResponse { request_id, variants }))
}

#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    pub variant_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChooseResponse {
    pub ok: bool,
    pub variant_id: String,
    pub content: String,
}

/// Record the user's chosen variant
///
/// Only variants of the user's latest request can be chosen; anything else
/// is reported as not found.
pub async fn choose(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ChooseRequest>, JsonRejection>,
) -> ApiResult<Json<ChooseResponse>> {
    let Json(request) = payload?;
    let pool = require_db(state.db_pool.clone())?;
    let selection = choose_variant(&pool, user.user_id, &request.variant_id).await?;

    Ok(Json(ChooseResponse {
        ok: true,
        variant_id: selection.variant_id,
        content: selection.content,
    }))
}

/// Validate and persist a choice; shared with the publish pipeline
pub async fn choose_variant(
    pool: &sqlx::SqlitePool,
    user_id: i64,
    variant_id: &str,
) -> ApiResult<AdSelection> {
    let variant_id = variant_id.trim();
    if variant_id.is_empty() {
        return Err(BackendError::bad_request("variant_id is required"));
    }

    let variant = repo::variant_in_latest_request(pool, user_id, variant_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Variant {} not in latest request of user {}", variant_id, user_id);
            BackendError::not_found("Variant not found in your latest request")
        })?;

    let selection = repo::choose(pool, user_id, &variant.id, &variant.content).await?;
    tracing::info!("User {} chose variant {}", user_id, variant.id);
    Ok(selection)
}

/// Current selection
pub async fn choice(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<AdSelection>> {
    let pool = require_db(state.db_pool.clone())?;
    repo::get_choice(&pool, user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("No selection yet"))
}

#[derive(Debug, Serialize)]
pub struct LatestRequestResponse {
    pub request_id: i64,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub variants: Vec<AdVariantRecord>,
}

/// Latest request with its variants
pub async fn latest_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<LatestRequestResponse>> {
    let pool = require_db(state.db_pool.clone())?;
    let (request, variants) = repo::latest_request_with_variants(&pool, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("No generation request yet"))?;

    let payload = serde_json::from_str(&request.payload).unwrap_or(serde_json::Value::Null);

    Ok(Json(LatestRequestResponse {
        request_id: request.id,
        payload,
        created_at: request.created_at,
        variants,
    }))
}
