//! Favorites commands.
//!
//! Favorites are stored in the local `SQLite` database; `toggle` fetches the
//! product first so the saved row carries its title, image, and price range.

use trend_core::ProductId;
use trend_storefront::config::StorefrontConfig;
use trend_storefront::error::Result;
use trend_storefront::shopify::StorefrontClient;

use super::{open_favorites, print_lines};

pub async fn list(config: &StorefrontConfig) -> Result<()> {
    let store = open_favorites(config).await?;
    let favorites = store.favorites().borrow().clone();

    if favorites.is_empty() {
        tracing::info!("No favorites saved");
        return Ok(());
    }

    print_lines(favorites.iter().map(|favorite| {
        format!(
            "{}  {}  added {}",
            favorite.product_id,
            favorite.title,
            favorite.added_at.format("%Y-%m-%d %H:%M")
        )
    }));
    Ok(())
}

pub async fn toggle(config: &StorefrontConfig, product_id: &str) -> Result<()> {
    let store = open_favorites(config).await?;
    let client = StorefrontClient::new(&config.shopify);
    let product = client
        .get_product_by_id(&ProductId::new(product_id))
        .await?;

    if store.toggle(&product).await? {
        tracing::info!(title = %product.title, "Added to favorites");
    } else {
        tracing::info!(title = %product.title, "Removed from favorites");
    }
    Ok(())
}

pub async fn remove(config: &StorefrontConfig, product_id: &str) -> Result<()> {
    let store = open_favorites(config).await?;
    store.remove(&ProductId::new(product_id)).await?;

    tracing::info!(%product_id, "Removed from favorites");
    Ok(())
}
