//! Local `SQLite` storage.
//!
//! # Database
//!
//! Stores local data only (Shopify is source of truth for products and carts):
//!
//! ## Tables
//!
//! - `favorites` - Products the shopper saved, with a display snapshot
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded at
//! compile time, and run via:
//! ```bash
//! cargo run -p trend-cli -- migrate
//! ```

pub mod favorites;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use favorites::{Favorite, FavoriteRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `SQLite` connection pool.
///
/// The database file is created when missing.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the URL is invalid or the
/// connection cannot be established.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if a migration fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Single-connection in-memory database with migrations applied.
///
/// Every pooled connection to `sqlite::memory:` gets its own database, so
/// the pool is pinned to one connection that is never recycled.
///
/// # Errors
///
/// Returns `RepositoryError` if the database cannot be opened or migrated.
#[cfg(test)]
pub(crate) async fn in_memory_pool() -> Result<SqlitePool, RepositoryError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
