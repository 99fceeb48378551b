//! Subcommand implementations.

pub mod catalog;
pub mod favorites;
pub mod migrate;
pub mod shop;

use std::sync::Arc;

use trend_storefront::config::StorefrontConfig;
use trend_storefront::db;
use trend_storefront::error::Result;
use trend_storefront::services::FavoriteStore;
use trend_storefront::shopify::Product;

/// Open the favorites database, applying pending migrations.
async fn open_favorites(config: &StorefrontConfig) -> Result<Arc<FavoriteStore>> {
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    Ok(Arc::new(FavoriteStore::open(pool).await?))
}

/// One product per line: ID, title, and price (or price range).
fn product_line(product: &Product) -> String {
    let range = &product.price_range;
    let price = if range.min_variant_price == range.max_variant_price {
        range.min_variant_price.formatted()
    } else {
        format!(
            "{} - {}",
            range.min_variant_price.formatted(),
            range.max_variant_price.formatted()
        )
    };
    format!("{}  {}  {price}", product.id, product.title)
}

#[allow(clippy::print_stdout)]
fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}
