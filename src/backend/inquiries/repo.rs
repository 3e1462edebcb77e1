/**
 * Inquiry Storage
 *
 * # Tables
 *
 * - `inquiries` - question, optional answer, optional author
 * - `inquiry_files` - attachments; the bytes live in object storage under `object_key`
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InquiryRecord {
    pub id: i64,
    /// `None` for anonymous inquiries
    pub user_id: Option<i64>,
    pub question: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InquiryFileRecord {
    pub id: i64,
    pub inquiry_id: i64,
    pub filename: String,
    pub object_key: String,
    pub content_type: Option<String>,
    pub size: Option<i64>,
    pub created_at: DateTime<Utc>,
}

const INQUIRY_COLUMNS: &str = "id, user_id, question, answer, created_at, answered_at";
const FILE_COLUMNS: &str = "id, inquiry_id, filename, object_key, content_type, size, created_at";

pub async fn create_inquiry(
    pool: &SqlitePool,
    user_id: Option<i64>,
    question: &str,
) -> Result<InquiryRecord, sqlx::Error> {
    sqlx::query_as::<_, InquiryRecord>(&format!(
        "INSERT INTO inquiries (user_id, question, created_at) VALUES (?, ?, ?) RETURNING {INQUIRY_COLUMNS}"
    ))
    .bind(user_id)
    .bind(question)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Remove an inquiry and, through the foreign key, its file rows
pub async fn delete_inquiry(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM inquiries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_file(
    pool: &SqlitePool,
    inquiry_id: i64,
    filename: &str,
    object_key: &str,
    content_type: &str,
    size: i64,
) -> Result<InquiryFileRecord, sqlx::Error> {
    sqlx::query_as::<_, InquiryFileRecord>(&format!(
        r#"
        INSERT INTO inquiry_files (inquiry_id, filename, object_key, content_type, size, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {FILE_COLUMNS}
        "#
    ))
    .bind(inquiry_id)
    .bind(filename)
    .bind(object_key)
    .bind(content_type)
    .bind(size)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn get_inquiry(pool: &SqlitePool, id: i64) -> Result<Option<InquiryRecord>, sqlx::Error> {
    sqlx::query_as::<_, InquiryRecord>(&format!("SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inquiries newest first; `owner = None` lists everyone's
pub async fn list_inquiries(
    pool: &SqlitePool,
    owner: Option<i64>,
) -> Result<Vec<InquiryRecord>, sqlx::Error> {
    match owner {
        Some(user_id) => {
            sqlx::query_as::<_, InquiryRecord>(&format!(
                "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE user_id = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(user_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, InquiryRecord>(&format!(
                "SELECT {INQUIRY_COLUMNS} FROM inquiries ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn files_for_inquiry(
    pool: &SqlitePool,
    inquiry_id: i64,
) -> Result<Vec<InquiryFileRecord>, sqlx::Error> {
    sqlx::query_as::<_, InquiryFileRecord>(&format!(
        "SELECT {FILE_COLUMNS} FROM inquiry_files WHERE inquiry_id = ? ORDER BY id"
    ))
    .bind(inquiry_id)
    .fetch_all(pool)
    .await
}

/// Set the answer; `None` when the inquiry does not exist
pub async fn answer_inquiry(
    pool: &SqlitePool,
    id: i64,
    answer: &str,
) -> Result<Option<InquiryRecord>, sqlx::Error> {
    sqlx::query_as::<_, InquiryRecord>(&format!(
        "UPDATE inquiries SET answer = ?, answered_at = ? WHERE id = ? RETURNING {INQUIRY_COLUMNS}"
    ))
    .bind(answer)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}
