//! Trend CLI - drive the shopping client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the local favorites database
//! trend migrate
//!
//! # Browse the catalog
//! trend products
//! trend product gid://shopify/Product/123
//! trend search "linen shirt" --sort price-asc
//! trend collections
//!
//! # Manage favorites
//! trend favorites list
//! trend favorites toggle gid://shopify/Product/123
//!
//! # Interactive cart session
//! trend shop
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trend_core::SortOption;
use trend_storefront::config::{ConfigError, StorefrontConfig};

mod commands;

#[derive(Parser)]
#[command(name = "trend")]
#[command(author, version, about = "Trend shopping client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run favorites database migrations
    Migrate,
    /// List the first page of products
    Products {
        /// Number of products to fetch
        #[arg(short, long, default_value_t = 20)]
        first: i64,
    },
    /// Show one product with its variants
    Product {
        /// Product ID (gid://shopify/Product/...)
        id: String,
    },
    /// Search products
    Search {
        /// Free-text query
        query: String,

        /// Sort order (relevance, price-asc, price-desc, newest, title)
        #[arg(short, long, default_value = "relevance")]
        sort: SortOption,
    },
    /// List collections
    Collections,
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Start an interactive cart session
    Shop,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List saved favorites
    List,
    /// Add a product to favorites, or remove it if already saved
    Toggle {
        /// Product ID
        product_id: String,
    },
    /// Remove a product from favorites
    Remove {
        /// Product ID
        product_id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration is needed for Sentry init; `migrate` runs without it
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trend_storefront=info,trend_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: Cli,
    config: Result<StorefrontConfig, ConfigError>,
) -> trend_storefront::error::Result<()> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Products { first } => commands::catalog::products(&config?, first).await,
        Commands::Product { id } => commands::catalog::product(&config?, &id).await,
        Commands::Search { query, sort } => {
            commands::catalog::search(&config?, &query, sort).await
        }
        Commands::Collections => commands::catalog::collections(&config?).await,
        Commands::Favorites { action } => {
            let config = config?;
            match action {
                FavoritesAction::List => commands::favorites::list(&config).await,
                FavoritesAction::Toggle { product_id } => {
                    commands::favorites::toggle(&config, &product_id).await
                }
                FavoritesAction::Remove { product_id } => {
                    commands::favorites::remove(&config, &product_id).await
                }
            }
        }
        Commands::Shop => commands::shop::run(&config?).await,
    }
}
