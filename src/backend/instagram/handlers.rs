/**
 * Instagram Handlers
 *
 * - `POST /api/ig/publish` - publish one image or a carousel
 * - `GET /api/instagram/latest-post` - latest post of an account
 *
 * Both routes require authentication.
 */

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::ads::repo;
use crate::backend::error::{ApiResult, BackendError};
use crate::backend::instagram::client::{LatestMedia, PublishOutcome, PublishPlan, MAX_CAROUSEL_ITEMS};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::server::state::{require_db, AppState};

/// Maximum number of collaborators on one post
pub const MAX_COLLABORATORS: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub collaborators: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublishResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub outcome: PublishOutcome,
}

#[derive(Debug, Deserialize)]
pub struct LatestPostQuery {
    pub username: Option<String>,
}

/// Validate collaborator usernames
///
/// At most three; a leading `@` is stripped and blank names are rejected.
pub fn normalize_collaborators(raw: Option<&[String]>) -> ApiResult<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.len() > MAX_COLLABORATORS {
        return Err(BackendError::bad_request(format!(
            "At most {MAX_COLLABORATORS} collaborators are allowed"
        )));
    }
    raw.iter()
        .map(|name| {
            let name = name.trim().trim_start_matches('@').trim();
            if name.is_empty() {
                Err(BackendError::bad_request("Collaborator username cannot be blank"))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

fn image_urls(request: &PublishRequest) -> ApiResult<Vec<String>> {
    let urls: Vec<String> = match &request.image_urls {
        Some(list) if !list.is_empty() => list.iter().map(|u| u.trim().to_string()).collect(),
        _ => request
            .image_url
            .iter()
            .map(|u| u.trim().to_string())
            .collect(),
    };
    if urls.is_empty() || urls.iter().any(String::is_empty) {
        return Err(BackendError::bad_request("image_url or image_urls is required"));
    }
    if urls.len() > MAX_CAROUSEL_ITEMS {
        return Err(BackendError::bad_request(format!(
            "A carousel holds at most {MAX_CAROUSEL_ITEMS} images"
        )));
    }
    Ok(urls)
}

/// Publish handler
///
/// Without an explicit caption the user's chosen variant is posted.
///
/// # Errors
///
/// * `400 Bad Request` - No images, too many collaborators, no caption
/// * `500 Internal Server Error` - Instagram credentials missing
/// * `502 Bad Gateway` - Graph API failure; the Graph error is attached as `upstream`
pub async fn publish(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> ApiResult<Json<PublishResponse>> {
    let Json(request) = payload?;
    let image_urls = image_urls(&request)?;
    let collaborators = normalize_collaborators(request.collaborators.as_deref())?;

    let caption = match request.caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(caption) => caption.to_string(),
        None => {
            let pool = require_db(state.db_pool.clone())?;
            repo::get_choice(&pool, user.user_id)
                .await?
                .map(|selection| selection.content)
                .ok_or_else(|| BackendError::bad_request("No caption given and no variant chosen"))?
        }
    };

    tracing::info!(
        "User {} publishing {} image(s){}",
        user.user_id,
        image_urls.len(),
        if request.dry_run { " (dry run)" } else { "" }
    );

    let outcome = state
        .instagram
        .publish(&PublishPlan {
            image_urls,
            caption,
            collaborators,
            dry_run: request.dry_run,
        })
        .await?;

    Ok(Json(PublishResponse { ok: true, outcome }))
}

/// Latest post handler
///
/// # Errors
///
/// * `404 Not Found` - The account has no posts
/// * `502 Bad Gateway` - Graph API failure (unknown username included)
pub async fn latest_post(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<LatestPostQuery>,
) -> ApiResult<Json<LatestMedia>> {
    state
        .instagram
        .latest_media(query.username.as_deref())
        .await?
        .map(Json)
        .ok_or_else(|| BackendError::not_found("No posts found"))
}
