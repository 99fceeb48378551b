//! The commerce backend contract consumed by the rest of the crate.

use std::future::Future;

use trend_core::{CartId, CartLineId, ProductId, SortOption, VariantId};

use super::ShopifyError;
use super::types::{Cart, Collection, Product};

/// Queries and cart mutations offered by the commerce backend.
///
/// [`super::StorefrontClient`] is the production implementation. Every
/// mutation either returns the updated cart or fails; user errors reported by
/// the backend are failures even when the transport succeeded.
pub trait CommerceApi: Send + Sync + 'static {
    /// First `first` products of the catalog.
    fn get_products(
        &self,
        first: i64,
    ) -> impl Future<Output = Result<Vec<Product>, ShopifyError>> + Send;

    /// A single product.
    fn get_product_by_id(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, ShopifyError>> + Send;

    /// Free-text product search.
    fn search_products(
        &self,
        query: &str,
        first: i64,
        sort: SortOption,
    ) -> impl Future<Output = Result<Vec<Product>, ShopifyError>> + Send;

    /// First `first` collections.
    fn get_collections(
        &self,
        first: i64,
    ) -> impl Future<Output = Result<Vec<Collection>, ShopifyError>> + Send;

    /// Create a cart seeded with one line.
    fn create_cart(
        &self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Fetch a cart; `None` when the backend no longer knows the ID.
    fn get_cart(
        &self,
        cart_id: &CartId,
    ) -> impl Future<Output = Result<Option<Cart>, ShopifyError>> + Send;

    /// Add (or merge) a line into an existing cart.
    fn add_cart_lines(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Set the quantity of an existing line.
    fn update_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
        quantity: u32,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;

    /// Remove a line.
    fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
    ) -> impl Future<Output = Result<Cart, ShopifyError>> + Send;
}
