//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! wire types in [`super::storefront::queries`]. Fetched values are
//! immutable snapshots: a refetch replaces them wholesale.

use serde::{Deserialize, Serialize};

pub use trend_core::Money;
use trend_core::{CartId, CartLineId, CollectionId, ProductId, VariantId};

// =============================================================================
// Product Types
// =============================================================================

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Blue").
    pub value: String,
}

impl SelectedOption {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Option pairs for this variant, in backend order.
    pub selected_options: Vec<SelectedOption>,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Product images.
    pub images: Vec<Image>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// URL of the first image, if any.
    #[must_use]
    pub fn featured_image_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// Collection title.
    pub title: String,
    /// Plain text description (empty when the backend has none).
    pub description: String,
    /// Collection image URL.
    pub image_url: Option<String>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line item in the cart.
///
/// Product and variant details are denormalized for display. `price` is the
/// per-unit price; line totals are never computed client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line ID (distinct from the variant ID).
    pub id: CartLineId,
    /// Quantity.
    pub quantity: u32,
    /// Purchased variant.
    pub variant_id: VariantId,
    /// Parent product.
    pub product_id: ProductId,
    /// Product title.
    pub product_title: String,
    /// Variant title.
    pub variant_title: String,
    /// Price per unit.
    pub price: Money,
    /// Variant image URL.
    pub image_url: Option<String>,
}

/// A shopping cart snapshot as last returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Checkout URL.
    pub checkout_url: String,
    /// Cart lines.
    pub lines: Vec<CartItem>,
    /// Total amount.
    pub total_amount: Money,
    /// Subtotal before tax/shipping.
    pub subtotal_amount: Money,
    /// Total item quantity.
    pub total_quantity: u32,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// User error from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Field path that caused the error.
    pub field: Vec<String>,
    /// Human-readable error message.
    pub message: String,
}
