//! Cart type conversion functions.

use tracing::warn;
use trend_core::{CartId, CartLineId, ProductId, VariantId};

use crate::shopify::types::{Cart, CartItem, UserError};

use super::super::queries::fragments::{CartFields, CartLineFields, UserErrorFields};
use super::convert_money;

pub fn convert_cart(cart: CartFields) -> Cart {
    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        lines: cart.lines.into_nodes().map(convert_cart_line).collect(),
        total_amount: convert_money(cart.cost.total_amount),
        subtotal_amount: convert_money(cart.cost.subtotal_amount),
        total_quantity: clamp_quantity(cart.total_quantity),
    }
}

fn convert_cart_line(line: CartLineFields) -> CartItem {
    let merchandise = line.merchandise;
    if merchandise.id.is_none() {
        warn!(line_id = %line.id, "Cart line merchandise is not a product variant");
    }

    let (product_id, product_title) = merchandise
        .product
        .map(|product| (product.id, product.title))
        .unwrap_or_default();

    CartItem {
        id: CartLineId::new(line.id),
        quantity: clamp_quantity(line.quantity),
        variant_id: VariantId::new(merchandise.id.unwrap_or_default()),
        product_id: ProductId::new(product_id),
        product_title,
        variant_title: merchandise.title.unwrap_or_default(),
        price: convert_money(line.cost.amount_per_quantity),
        image_url: merchandise.image.map(|image| image.url),
    }
}

/// Quantities are non-negative on the wire; clamp anything else to zero.
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(0)
}

pub fn convert_user_error(error: UserErrorFields) -> UserError {
    UserError {
        field: error.field.unwrap_or_default(),
        message: error.message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart_json(merchandise: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "gid://shopify/Cart/abc",
            "checkoutUrl": "https://shop.example.com/cart/c/abc",
            "totalQuantity": 3,
            "cost": {
                "totalAmount": { "amount": "59.97", "currencyCode": "EUR" },
                "subtotalAmount": { "amount": "59.97", "currencyCode": "EUR" }
            },
            "lines": { "edges": [ { "node": {
                "id": "gid://shopify/CartLine/1",
                "quantity": 3,
                "cost": { "amountPerQuantity": { "amount": "19.99", "currencyCode": "EUR" } },
                "merchandise": merchandise
            } } ] }
        })
    }

    #[test]
    fn test_convert_cart_denormalizes_variant_and_product() {
        let fields: CartFields = serde_json::from_value(cart_json(serde_json::json!({
            "id": "gid://shopify/ProductVariant/7",
            "title": "M / Black",
            "price": { "amount": "19.99", "currencyCode": "EUR" },
            "image": { "url": "https://cdn.example.com/tee.jpg" },
            "product": { "id": "gid://shopify/Product/3", "title": "Tee" }
        })))
        .unwrap();

        let cart = convert_cart(fields);

        assert_eq!(cart.id.as_str(), "gid://shopify/Cart/abc");
        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.total_amount.formatted(), "59.97€");
        let line = &cart.lines[0];
        assert_eq!(line.id.as_str(), "gid://shopify/CartLine/1");
        assert_eq!(line.variant_id.as_str(), "gid://shopify/ProductVariant/7");
        assert_eq!(line.product_id.as_str(), "gid://shopify/Product/3");
        assert_eq!(line.product_title, "Tee");
        assert_eq!(line.variant_title, "M / Black");
        assert_eq!(line.price.amount, "19.99");
        assert_eq!(line.image_url.as_deref(), Some("https://cdn.example.com/tee.jpg"));
    }

    #[test]
    fn test_non_variant_merchandise_yields_empty_fields() {
        let fields: CartFields = serde_json::from_value(cart_json(serde_json::json!({}))).unwrap();

        let cart = convert_cart(fields);

        let line = &cart.lines[0];
        assert_eq!(line.variant_id.as_str(), "");
        assert_eq!(line.product_title, "");
        assert!(line.image_url.is_none());
    }

    #[test]
    fn test_user_error_without_field() {
        let error = convert_user_error(UserErrorFields {
            field: None,
            message: "Cart not found".to_string(),
        });
        assert!(error.field.is_empty());
        assert_eq!(error.message, "Cart not found");
    }
}
