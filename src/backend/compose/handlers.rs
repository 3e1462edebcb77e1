/**
 * Card Composition Handler
 *
 * `POST /api/compose/card` downloads the background and the store photo
 * from object storage, renders the card and uploads it as
 * `composed/{session_id|common}/{uuid}.jpg`.
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::compose::layout::district_label;
use crate::backend::compose::render::{self, load_font};
use crate::backend::compose::ComposeError;
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::storage::handlers::sanitize_prefix;

#[derive(Debug, Clone, Deserialize)]
pub struct ComposeCardRequest {
    /// Background object key, `CARD_BACKGROUND_KEY` when absent
    #[serde(default)]
    pub bg_key: Option<String>,
    /// Store photo object key (the `rel` of an upload)
    pub image_key: String,
    pub store_name: String,
    #[serde(default)]
    pub area_keywords: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedCard {
    pub ok: bool,
    /// Object key of the card
    pub rel: String,
    /// Presigned GET URL of the card
    pub url: String,
}

/// Render a card from two stored images and upload it under `prefix`
///
/// Shared by the compose endpoint and the publish pipeline.
pub async fn render_and_store(
    state: &AppState,
    bg_key: &str,
    image_key: &str,
    store_name: &str,
    district: &str,
    prefix: &str,
) -> ApiResult<ComposedCard> {
    let store_name = store_name.trim();
    if store_name.is_empty() {
        return Err(BackendError::bad_request("store_name is required"));
    }

    // Load the font before any download
    let font = load_font(&state.config.card.font_path)?;
    let district_rgb = state
        .config
        .card
        .district_rgb()
        .map_err(|e| BackendError::state(e.to_string()))?;

    let background = state.storage.get_object(bg_key).await?;
    let photo = state.storage.get_object(image_key).await?;
    tracing::debug!(
        "Composing card: bg={} ({} bytes), photo={} ({} bytes)",
        bg_key,
        background.len(),
        image_key,
        photo.len()
    );

    let store_name_owned = store_name.to_string();
    let district_owned = district.to_string();
    let jpeg = tokio::task::spawn_blocking(move || {
        render::compose_card(
            &font,
            &background,
            &photo,
            &store_name_owned,
            &district_owned,
            district_rgb,
        )
    })
    .await
    .map_err(|e| ComposeError::Join(e.to_string()))??;

    let key = format!("{}/{}.jpg", prefix.trim_matches('/'), Uuid::new_v4().simple());
    state.storage.put_object(&key, jpeg, "image/jpeg").await?;
    let url = state.storage.presigned_get(&key, None)?;
    tracing::info!("Card stored at {}", key);

    Ok(ComposedCard { ok: true, rel: key, url })
}

/// Compose card handler
///
/// # Errors
///
/// * `400 Bad Request` - Blank store name or undecodable image
/// * `500 Internal Server Error` - Font or storage credentials missing
/// * `502 Bad Gateway` - Object download or upload failed
///
/// # Example Request
///
/// ```http
/// POST /api/compose/card HTTP/1.1
/// Authorization: Bearer eyJhbGciOi...
/// Content-Type: application/json
///
/// {"image_key": "uploads/s1/2b1c.jpg", "store_name": "묭이카페", "area_keywords": ["성수동"], "session_id": "s1"}
/// ```
pub async fn compose_card(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    payload: Result<Json<ComposeCardRequest>, JsonRejection>,
) -> ApiResult<Json<ComposedCard>> {
    let Json(request) = payload?;
    let bg_key = request
        .bg_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(state.config.card.background_key.as_str())
        .to_string();
    let district = district_label(&request.area_keywords);
    let session = sanitize_prefix(request.session_id.as_deref(), "common");
    let prefix = format!("composed/{session}");

    let card = render_and_store(
        &state,
        &bg_key,
        request.image_key.trim(),
        &request.store_name,
        &district,
        &prefix,
    )
    .await?;

    Ok(Json(card))
}
