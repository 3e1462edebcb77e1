/**
 * Storage Handlers
 *
 * - `POST /api/files/upload` - multipart image upload
 * - `GET /api/files/presigned-get` - presigned URL for an existing key
 *
 * Uploaded objects are stored under
 * `{subdir|uploads}/{session_id|common}/{uuid}{ext}`. `subdir` and
 * `session_id` may be sent as form fields or query parameters.
 */

use axum::{
    extract::{multipart::Field, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::{ApiResult, BackendError};
use crate::backend::middleware::auth::AuthUser;
use crate::backend::storage::ObjectStore;

/// Per-file upload limit
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for images
pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// A file read from a multipart field
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl IncomingFile {
    /// Reject content types outside `allowed`
    pub fn ensure_content_type(&self, allowed: &[&str]) -> ApiResult<()> {
        if allowed.contains(&self.content_type.as_str()) {
            Ok(())
        } else {
            Err(BackendError::bad_request(format!(
                "Unsupported content type: {}",
                self.content_type
            )))
        }
    }

    /// Lower-case extension of the original name, `.jpg` when absent
    pub fn extension(&self) -> String {
        file_extension(&self.original_name)
    }
}

/// Read a file field, enforcing [`MAX_UPLOAD_BYTES`] while streaming
pub async fn read_file_field(mut field: Field<'_>) -> ApiResult<IncomingFile> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(BackendError::handler(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File exceeds {} MB", MAX_UPLOAD_BYTES / (1024 * 1024)),
            ));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(IncomingFile {
        original_name,
        content_type,
        data: data.freeze(),
    })
}

/// Extension (with dot) taken from a client file name
pub fn file_extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| ".jpg".to_string())
}

/// Keep `[A-Za-z0-9_-/]`, drop empty segments, fall back to `default`
pub fn sanitize_prefix(raw: Option<&str>, default: &str) -> String {
    let cleaned: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/'))
        .collect();
    let joined = cleaned
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        default.to_string()
    } else {
        joined
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    pub subdir: Option<String>,
    pub session_id: Option<String>,
}

/// Stored object description
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredFile {
    /// Generated file name (`{uuid}{ext}`)
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub size: usize,
    /// Object key
    pub rel: String,
    /// Presigned GET URL
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub files: Vec<StoredFile>,
}

/// Upload one or more images
///
/// # Errors
///
/// * `400 Bad Request` - No files, or a file is not JPEG/PNG/WebP
/// * `413 Payload Too Large` - A file exceeds 10 MB
/// * `502 Bad Gateway` - The object store rejected the upload
pub async fn upload_files(
    AuthUser(user): AuthUser,
    State(store): State<ObjectStore>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut files = Vec::new();
    let mut subdir = params.subdir;
    let mut session_id = params.session_id;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let file = read_file_field(field).await?;
                file.ensure_content_type(IMAGE_CONTENT_TYPES)?;
                files.push(file);
            }
            "subdir" => subdir = Some(field.text().await?),
            "session_id" => session_id = Some(field.text().await?),
            other => tracing::debug!("ignoring multipart field {}", other),
        }
    }

    if files.is_empty() {
        return Err(BackendError::bad_request("No files were uploaded"));
    }

    let prefix = format!(
        "{}/{}",
        sanitize_prefix(subdir.as_deref(), "uploads"),
        sanitize_prefix(session_id.as_deref(), "common"),
    );

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        let filename = format!("{}{}", Uuid::new_v4().simple(), file.extension());
        let key = format!("{prefix}/{filename}");
        let size = file.data.len();
        store.put_object(&key, file.data, &file.content_type).await?;
        let url = store.presigned_get(&key, None)?;
        stored.push(StoredFile {
            filename,
            original_filename: file.original_name,
            content_type: file.content_type,
            size,
            rel: key,
            url,
        });
    }

    tracing::info!(user_id = user.user_id, count = stored.len(), "files uploaded");
    Ok(Json(UploadResponse { ok: true, files: stored }))
}

#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    pub key: String,
    pub expires: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignResponse {
    pub ok: bool,
    pub key: String,
    pub url: String,
    pub expires: u64,
}

/// Presigned GET URL for an object key
pub async fn presigned_get(
    AuthUser(_user): AuthUser,
    State(store): State<ObjectStore>,
    Query(query): Query<PresignQuery>,
) -> ApiResult<Json<PresignResponse>> {
    let key = query.key.trim().to_string();
    if key.is_empty() {
        return Err(BackendError::bad_request("key is required"));
    }
    let expires = query
        .expires
        .unwrap_or_else(|| store.default_expires())
        .clamp(1, crate::backend::storage::sigv4::MAX_PRESIGN_EXPIRES);
    let url = store.presigned_get(&key, Some(expires))?;
    Ok(Json(PresignResponse { ok: true, key, url, expires }))
}
