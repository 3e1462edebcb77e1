/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations.
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,
    /// User email address (unique)
    pub email: String,
    /// Hashed password (bcrypt)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Inactive users cannot log in or use their tokens
    pub is_active: bool,
    /// Administrators see and answer every inquiry
    pub is_admin: bool,
    /// Verified business registration number (digits only)
    pub business_registration_number: Option<String>,
    pub representative_name: Option<String>,
    /// Opening date as YYYYMMDD
    pub opening_date: Option<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub business_registration_number: Option<String>,
    pub representative_name: Option<String>,
    pub opening_date: Option<String>,
    pub is_admin: bool,
}

const USER_COLUMNS: &str = "id, email, password_hash, is_active, is_admin, \
    business_registration_number, representative_name, opening_date, created_at, updated_at";

/// Create a new user
///
/// # Returns
/// Created user or error (a duplicate email surfaces as a unique violation)
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, password_hash, is_active, is_admin,
                           business_registration_number, representative_name, opening_date,
                           created_at, updated_at)
        VALUES (?, ?, 1, ?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.is_admin)
    .bind(&new_user.business_registration_number)
    .bind(&new_user.representative_name)
    .bind(&new_user.opening_date)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by email
///
/// # Returns
/// User or None if not found
pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Get user by ID
///
/// # Returns
/// User or None if not found
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Make sure an administrator account exists for `email`
///
/// Creates the account when missing, otherwise promotes the existing user.
///
/// # Returns
/// `true` when a new account was created
pub async fn ensure_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<bool, sqlx::Error> {
    if let Some(existing) = get_user_by_email(pool, email).await? {
        if !existing.is_admin {
            sqlx::query("UPDATE users SET is_admin = 1, updated_at = ? WHERE id = ?")
                .bind(Utc::now())
                .bind(existing.id)
                .execute(pool)
                .await?;
        }
        return Ok(false);
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to hash admin password: {e}")))?;

    create_user(
        pool,
        NewUser {
            email: email.to_string(),
            password_hash,
            business_registration_number: None,
            representative_name: None,
            opening_date: None,
            is_admin: true,
        },
    )
    .await?;

    Ok(true)
}

/// True when the error is a UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
