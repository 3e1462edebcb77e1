//! Choose-and-publish pipeline
//!
//! `POST /api/choose-publish` chains the other modules in one request:
//! record the chosen variant, compose the card from the latest brief, and
//! publish card plus extra photos with the chosen caption.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::ads::handlers::choose_variant;
use crate::backend::ads::repo;
use crate::backend::compose::layout::district_label;
use crate::backend::compose::render_and_store;
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::instagram::{normalize_collaborators, PublishPlan, MAX_CAROUSEL_ITEMS};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::{require_db, AppState};

#[derive(Debug, Deserialize)]
pub struct ChoosePublishRequest {
    pub variant_id: String,
    /// First key is the card photo, the rest become extra carousel items
    pub image_keys: Vec<String>,
    #[serde(default)]
    pub bg_key: Option<String>,
    #[serde(default)]
    pub collaborators: Option<Vec<String>>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChoosePublishResponse {
    pub ok: bool,
    pub variant_id: String,
    pub card_key: String,
    pub card_url: String,
    pub creation_id: String,
    pub media_id: Option<String>,
    pub permalink: Option<String>,
    pub published: bool,
    pub verified_by_fallback: bool,
    pub collaborators: Vec<String>,
    pub collaborators_status: Option<Vec<Value>>,
}

/// Store name and area keywords of a stored brief
fn brief_fields(payload: &str) -> (String, Vec<String>) {
    let brief: Value = serde_json::from_str(payload).unwrap_or(Value::Null);
    let store_name = brief
        .get("store_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let area_keywords = brief
        .get("area_keywords")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    (store_name, area_keywords)
}

fn clean_keys(raw: &[String]) -> ApiResult<Vec<String>> {
    let keys: Vec<String> = raw
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return Err(BackendError::bad_request("image_keys must contain at least one key"));
    }
    if keys.len() > MAX_CAROUSEL_ITEMS {
        return Err(BackendError::bad_request(format!(
            "image_keys holds at most {MAX_CAROUSEL_ITEMS} keys"
        )));
    }
    Ok(keys)
}

/// Choose, compose and publish in one call
///
/// # Errors
///
/// * `400 Bad Request` - No image keys, bad collaborators, brief without store name
/// * `404 Not Found` - Variant not in the latest request
/// * `502 Bad Gateway` - Storage or Graph API failure
pub async fn choose_publish(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<ChoosePublishRequest>, JsonRejection>,
) -> ApiResult<Json<ChoosePublishResponse>> {
    let Json(request) = payload?;
    let image_keys = clean_keys(&request.image_keys)?;
    let collaborators = normalize_collaborators(request.collaborators.as_deref())?;
    let pool = require_db(state.db_pool.clone())?;

    // The brief is checked before the choice is recorded
    let latest = repo::latest_request(&pool, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("No generation request yet"))?;
    let (store_name, area_keywords) = brief_fields(&latest.payload);
    if store_name.trim().is_empty() {
        return Err(BackendError::bad_request("Latest brief has no store_name"));
    }

    let selection = choose_variant(&pool, user.user_id, &request.variant_id).await?;

    let bg_key = request
        .bg_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(state.config.card.background_key.as_str())
        .to_string();
    let card = render_and_store(
        &state,
        &bg_key,
        &image_keys[0],
        &store_name,
        &district_label(&area_keywords),
        &format!("composed/{}", user.user_id),
    )
    .await?;

    let mut image_urls = Vec::with_capacity(image_keys.len());
    image_urls.push(card.url.clone());
    for key in &image_keys[1..] {
        image_urls.push(state.storage.presigned_get(key, None)?);
    }

    let outcome = state
        .instagram
        .publish(&PublishPlan {
            image_urls,
            caption: selection.content,
            collaborators,
            dry_run: request.dry_run,
        })
        .await?;
    tracing::info!(
        "Pipeline finished for user {}: card {}, published={}",
        user.user_id,
        card.rel,
        outcome.published
    );

    Ok(Json(ChoosePublishResponse {
        ok: true,
        variant_id: selection.variant_id,
        card_key: card.rel,
        card_url: card.url,
        creation_id: outcome.creation_id,
        media_id: outcome.media_id,
        permalink: outcome.permalink,
        published: outcome.published,
        verified_by_fallback: outcome.verified_by_fallback,
        collaborators: outcome.collaborators,
        collaborators_status: outcome.collaborators_status,
    }))
}
