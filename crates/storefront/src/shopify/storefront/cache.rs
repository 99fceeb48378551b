//! Cache types for Storefront API responses.

use crate::shopify::types::{Collection, Product};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Collections(Vec<Collection>),
}

/// Cache key for a single product.
pub fn product_key(id: &str) -> String {
    format!("product:{id}")
}

/// Cache key for the first page of the catalog.
pub fn products_key(first: i64) -> String {
    format!("products:{first}")
}

/// Cache key for the first page of collections.
pub fn collections_key(first: i64) -> String {
    format!("collections:{first}")
}
