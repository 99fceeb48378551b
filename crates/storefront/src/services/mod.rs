//! State shared across screens.
//!
//! # Services
//!
//! - `cart` - Session cart synchronized with the Storefront API
//! - `favorites` - Locally saved products with reactive observation
//! - `variants` - Option-group derivation and variant resolution

pub mod cart;
pub mod favorites;
pub mod variants;

pub use cart::CartSynchronizer;
pub use favorites::FavoriteStore;
pub use variants::{OptionGroup, VariantResolver, option_groups};
