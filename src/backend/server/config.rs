/**
 * Server Configuration
 *
 * This module handles loading the application configuration and the
 * optional SQLite database connection.
 *
 * # Configuration Sources
 *
 * Configuration is loaded from environment variables (see
 * `shared::config::AppConfig::from_env`), with defaults for local
 * development when possible.
 *
 * # Error Handling
 *
 * Database errors are logged but do not prevent server startup. The pool
 * is set to `None` and database-backed endpoints answer 503.
 */

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::shared::AppConfig;

/// Database configuration result
pub type DatabaseConfig = Option<SqlitePool>;

/// Connect to a SQLite database and run migrations
///
/// In-memory databases are restricted to a single connection that is never
/// recycled, otherwise every pooled connection would see its own empty
/// database.
///
/// # Errors
///
/// Returns the connection or migration error.
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(8)
    };

    let pool = pool_options.connect_with(options).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

/// Load and initialize the database connection pool
///
/// # Returns
///
/// - `Some(SqlitePool)` if the database is successfully configured
/// - `None` if `DATABASE_URL` is unset or the connection fails
pub async fn load_database(config: &AppConfig) -> DatabaseConfig {
    let database_url = match &config.server.database_url {
        Some(url) => url,
        None => {
            tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Connecting to database and running migrations...");

    match connect_database(database_url).await {
        Ok(pool) => {
            tracing::info!("Database ready");
            Some(pool)
        }
        Err(e) => {
            tracing::error!("Failed to initialise database: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            None
        }
    }
}
