/**
 * Ad Request Storage
 *
 * Persistence for generation requests, their caption variants and the
 * per-user selection.
 *
 * # Tables
 *
 * - `ad_requests` - one row per generation, raw brief as JSON text
 * - `ad_variants` - captions of a request, ordered by `index_no`
 * - `ad_selections` - at most one row per user (unique `user_id`)
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::backend::ads::parser::ParsedVariant;

/// Stored generation request
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdRequestRecord {
    pub id: i64,
    pub user_id: i64,
    /// Brief as submitted, JSON text
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// Stored caption variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AdVariantRecord {
    pub id: String,
    pub request_id: i64,
    pub index_no: i64,
    pub content: String,
}

/// The caption a user picked
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdSelection {
    pub id: i64,
    pub user_id: i64,
    pub variant_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Save a request and its variants in one transaction
///
/// # Returns
/// The new request id
pub async fn save_request_with_variants(
    pool: &SqlitePool,
    user_id: i64,
    payload: &serde_json::Value,
    variants: &[ParsedVariant],
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let (request_id,): (i64,) = sqlx::query_as(
        "INSERT INTO ad_requests (user_id, payload, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(payload.to_string())
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    for (index_no, variant) in variants.iter().enumerate() {
        sqlx::query(
            "INSERT INTO ad_variants (id, request_id, index_no, content) VALUES (?, ?, ?, ?)",
        )
        .bind(&variant.id)
        .bind(request_id)
        .bind(index_no as i64)
        .bind(&variant.content)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(request_id)
}

/// Most recent request of a user
pub async fn latest_request(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<AdRequestRecord>, sqlx::Error> {
    sqlx::query_as::<_, AdRequestRecord>(
        r#"
        SELECT id, user_id, payload, created_at
        FROM ad_requests
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Variants of a request in generation order
pub async fn variants_for_request(
    pool: &SqlitePool,
    request_id: i64,
) -> Result<Vec<AdVariantRecord>, sqlx::Error> {
    sqlx::query_as::<_, AdVariantRecord>(
        "SELECT id, request_id, index_no, content FROM ad_variants WHERE request_id = ? ORDER BY index_no",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await
}

/// Latest request together with its variants
pub async fn latest_request_with_variants(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<(AdRequestRecord, Vec<AdVariantRecord>)>, sqlx::Error> {
    let Some(request) = latest_request(pool, user_id).await? else {
        return Ok(None);
    };
    let variants = variants_for_request(pool, request.id).await?;
    Ok(Some((request, variants)))
}

/// Look up a variant only if it belongs to the user's latest request
pub async fn variant_in_latest_request(
    pool: &SqlitePool,
    user_id: i64,
    variant_id: &str,
) -> Result<Option<AdVariantRecord>, sqlx::Error> {
    let Some(request) = latest_request(pool, user_id).await? else {
        return Ok(None);
    };
    sqlx::query_as::<_, AdVariantRecord>(
        "SELECT id, request_id, index_no, content FROM ad_variants WHERE id = ? AND request_id = ?",
    )
    .bind(variant_id)
    .bind(request.id)
    .fetch_optional(pool)
    .await
}

/// Replace the user's selection
///
/// Delete-then-insert inside one transaction keeps a single row per user.
pub async fn choose(
    pool: &SqlitePool,
    user_id: i64,
    variant_id: &str,
    content: &str,
) -> Result<AdSelection, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM ad_selections WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let selection = sqlx::query_as::<_, AdSelection>(
        r#"
        INSERT INTO ad_selections (user_id, variant_id, content, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, variant_id, content, created_at
        "#,
    )
    .bind(user_id)
    .bind(variant_id)
    .bind(content)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(selection)
}

/// Current selection of a user
pub async fn get_choice(pool: &SqlitePool, user_id: i64) -> Result<Option<AdSelection>, sqlx::Error> {
    sqlx::query_as::<_, AdSelection>(
        "SELECT id, user_id, variant_id, content, created_at FROM ad_selections WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
