//! Read-only catalog commands.
//!
//! # Usage
//!
//! ```bash
//! trend products --first 10
//! trend product gid://shopify/Product/123
//! trend search "linen" --sort price-asc
//! trend collections
//! ```

use trend_core::{ProductId, SortOption};
use trend_storefront::config::StorefrontConfig;
use trend_storefront::error::Result;
use trend_storefront::screens::{COLLECTION_PAGE_SIZE, PRODUCT_PAGE_SIZE};
use trend_storefront::services::option_groups;
use trend_storefront::shopify::StorefrontClient;

use super::{print_lines, product_line};

/// List the first `first` products.
pub async fn products(config: &StorefrontConfig, first: i64) -> Result<()> {
    let client = StorefrontClient::new(&config.shopify);
    let products = client.get_products(first).await?;

    tracing::info!(count = products.len(), "Fetched products");
    print_lines(products.iter().map(product_line));
    Ok(())
}

/// Show a product, its option groups, and every variant.
pub async fn product(config: &StorefrontConfig, id: &str) -> Result<()> {
    let client = StorefrontClient::new(&config.shopify);
    let product = client.get_product_by_id(&ProductId::new(id)).await?;

    let mut lines = vec![product_line(&product)];
    if !product.description.is_empty() {
        lines.push(product.description.clone());
    }
    for group in option_groups(&product.variants) {
        lines.push(format!("{}: {}", group.name, group.values.join(", ")));
    }
    for variant in &product.variants {
        let stock = if variant.available_for_sale {
            ""
        } else {
            "  (sold out)"
        };
        lines.push(format!(
            "  {}  {}  {}{stock}",
            variant.id,
            variant.title,
            variant.price.formatted()
        ));
    }

    print_lines(lines);
    Ok(())
}

/// Run one search with the given sort order.
pub async fn search(config: &StorefrontConfig, query: &str, sort: SortOption) -> Result<()> {
    let client = StorefrontClient::new(&config.shopify);
    let products = client
        .search_products(query, PRODUCT_PAGE_SIZE, sort)
        .await?;

    tracing::info!(count = products.len(), %sort, "Search complete");
    print_lines(products.iter().map(product_line));
    Ok(())
}

/// List collections.
pub async fn collections(config: &StorefrontConfig) -> Result<()> {
    let client = StorefrontClient::new(&config.shopify);
    let collections = client.get_collections(COLLECTION_PAGE_SIZE).await?;

    print_lines(
        collections
            .iter()
            .map(|collection| format!("{}  {}", collection.id, collection.title)),
    );
    Ok(())
}
