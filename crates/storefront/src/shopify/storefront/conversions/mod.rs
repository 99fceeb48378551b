//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod collections;
pub mod products;

pub use cart::{convert_cart, convert_user_error};
pub use collections::convert_collection;
pub use products::convert_product;

use trend_core::Money;

use super::queries::fragments::MoneyFields;

/// Convert a `MoneyV2` selection.
pub fn convert_money(money: MoneyFields) -> Money {
    Money {
        amount: money.amount,
        currency_code: money.currency_code,
    }
}
