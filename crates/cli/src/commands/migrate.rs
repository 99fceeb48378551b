//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! trend migrate
//! ```
//!
//! # Environment Variables
//!
//! - `TREND_DATABASE_URL` - `SQLite` URL (default: `sqlite://trend.db?mode=rwc`)
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded
//! into the binary.

use trend_storefront::config::database_url_from_env;
use trend_storefront::db;
use trend_storefront::error::Result;

/// Run favorites database migrations.
pub async fn run() -> Result<()> {
    let database_url = database_url_from_env();

    tracing::info!("Opening favorites database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
