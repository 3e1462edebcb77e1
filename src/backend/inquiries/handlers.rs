/**
 * Inquiry Handlers
 *
 * - `POST /api/inquiries` - create an inquiry (login optional), multipart
 * - `GET /api/inquiries` - list inquiries (admins see all)
 * - `GET /api/inquiries/{id}` - one inquiry (owner or admin)
 * - `POST /api/inquiries/{id}/answer` - answer an inquiry (admin)
 */

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::inquiries::repo::{self, InquiryFileRecord, InquiryRecord};
use crate::backend::middleware::auth::{AuthUser, AuthenticatedUser, OptionalAuthUser};
use crate::backend::server::state::{require_db, AppState};
use crate::backend::storage::handlers::{read_file_field, IncomingFile, IMAGE_CONTENT_TYPES};
use crate::backend::storage::ObjectStore;

/// Attachment types: images plus PDF
fn attachment_allowed(content_type: &str) -> bool {
    IMAGE_CONTENT_TYPES.contains(&content_type) || content_type == "application/pdf"
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InquiryFileResponse {
    pub id: i64,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    /// Presigned GET URL
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InquiryResponse {
    pub id: i64,
    pub user_id: Option<i64>,
    pub question: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
    pub files: Vec<InquiryFileResponse>,
}

impl InquiryResponse {
    fn build(
        store: &ObjectStore,
        inquiry: InquiryRecord,
        files: Vec<InquiryFileRecord>,
    ) -> ApiResult<Self> {
        let files = files
            .into_iter()
            .map(|file| {
                Ok(InquiryFileResponse {
                    url: store.presigned_get(&file.object_key, None)?,
                    id: file.id,
                    filename: file.filename,
                    content_type: file.content_type,
                    size: file.size,
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        Ok(Self {
            id: inquiry.id,
            user_id: inquiry.user_id,
            question: inquiry.question,
            answer: inquiry.answer,
            created_at: inquiry.created_at,
            answered_at: inquiry.answered_at,
            files,
        })
    }

    async fn load(pool: &SqlitePool, store: &ObjectStore, inquiry: InquiryRecord) -> ApiResult<Self> {
        let files = repo::files_for_inquiry(pool, inquiry.id).await?;
        Self::build(store, inquiry, files)
    }
}

fn ensure_can_view(user: &AuthenticatedUser, inquiry: &InquiryRecord) -> ApiResult<()> {
    if user.is_admin || inquiry.user_id == Some(user.user_id) {
        Ok(())
    } else {
        Err(BackendError::forbidden("Not your inquiry"))
    }
}

/// Upload attachments and record them
async fn store_attachments(
    pool: &SqlitePool,
    store: &ObjectStore,
    inquiry_id: i64,
    files: Vec<IncomingFile>,
) -> ApiResult<Vec<InquiryFileRecord>> {
    let mut records = Vec::with_capacity(files.len());
    for file in files {
        let key = format!("inquiries/{}/{}{}", inquiry_id, Uuid::new_v4().simple(), file.extension());
        let size = file.data.len() as i64;
        store.put_object(&key, file.data, &file.content_type).await?;
        let filename = if file.original_name.is_empty() {
            key.rsplit('/').next().unwrap_or_default().to_string()
        } else {
            file.original_name
        };
        records.push(repo::add_file(pool, inquiry_id, &filename, &key, &file.content_type, size).await?);
    }
    Ok(records)
}

/// Create an inquiry
///
/// Multipart fields: `question` (text) and any number of `files`.
///
/// # Errors
///
/// * `400 Bad Request` - Blank question or unsupported attachment type
/// * `413 Payload Too Large` - An attachment exceeds 10 MB
/// * `502 Bad Gateway` - Attachment upload failed; the inquiry is not kept
pub async fn create_inquiry(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<InquiryResponse>)> {
    let pool = require_db(state.db_pool.clone())?;

    let mut question = String::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => question = field.text().await?,
            "files" | "file" => {
                if field.file_name().map_or(true, str::is_empty) {
                    // Browsers send an empty part when no file is picked
                    continue;
                }
                let file = read_file_field(field).await?;
                if !attachment_allowed(&file.content_type) {
                    return Err(BackendError::bad_request(format!(
                        "Unsupported attachment type: {}",
                        file.content_type
                    )));
                }
                files.push(file);
            }
            other => tracing::debug!("ignoring multipart field {}", other),
        }
    }

    let question = question.trim();
    if question.is_empty() {
        return Err(BackendError::bad_request("question is required"));
    }

    let user_id = user.map(|u| u.user_id);
    let inquiry = repo::create_inquiry(&pool, user_id, question).await?;

    let records = match store_attachments(&pool, &state.storage, inquiry.id, files).await {
        Ok(records) => records,
        Err(e) => {
            if let Err(cleanup) = repo::delete_inquiry(&pool, inquiry.id).await {
                tracing::error!("Failed to remove inquiry {}: {:?}", inquiry.id, cleanup);
            }
            return Err(e);
        }
    };
    tracing::info!(
        "Inquiry {} created by {:?} with {} attachment(s)",
        inquiry.id,
        user_id,
        records.len()
    );

    let response = InquiryResponse::build(&state.storage, inquiry, records)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List inquiries, newest first
pub async fn list_inquiries(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<InquiryResponse>>> {
    let pool = require_db(state.db_pool.clone())?;
    let owner = if user.is_admin { None } else { Some(user.user_id) };

    let mut responses = Vec::new();
    for inquiry in repo::list_inquiries(&pool, owner).await? {
        responses.push(InquiryResponse::load(&pool, &state.storage, inquiry).await?);
    }
    Ok(Json(responses))
}

/// One inquiry
pub async fn get_inquiry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<InquiryResponse>> {
    let pool = require_db(state.db_pool.clone())?;
    let inquiry = repo::get_inquiry(&pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Inquiry not found"))?;
    ensure_can_view(&user, &inquiry)?;

    Ok(Json(InquiryResponse::load(&pool, &state.storage, inquiry).await?))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// Answer an inquiry (administrators only)
pub async fn answer_inquiry(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> ApiResult<Json<InquiryResponse>> {
    if !user.is_admin {
        return Err(BackendError::forbidden("Only administrators can answer inquiries"));
    }
    let Json(request) = payload?;
    let answer = request.answer.trim();
    if answer.is_empty() {
        return Err(BackendError::bad_request("answer is required"));
    }

    let pool = require_db(state.db_pool.clone())?;
    let inquiry = repo::answer_inquiry(&pool, id, answer)
        .await?
        .ok_or_else(|| BackendError::not_found("Inquiry not found"))?;
    tracing::info!("Inquiry {} answered by admin {}", id, user.user_id);

    Ok(Json(InquiryResponse::load(&pool, &state.storage, inquiry).await?))
}
