//! Integration tests for the Trend shopping client.
//!
//! Each test stands up a `wiremock` server playing the Storefront GraphQL
//! endpoint, points a real [`StorefrontClient`] at it, and matches requests
//! by their GraphQL `operationName`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p trend-integration-tests
//! ```

use secrecy::SecretString;
use serde_json::{Value, json};
use trend_storefront::config::ShopifyStorefrontConfig;
use trend_storefront::shopify::StorefrontClient;
use url::Url;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Access token sent by every test client.
pub const TEST_TOKEN: &str = "4f9d2c81a7e35b06d1c8f2e9a04b7d53";

/// Config pointing at the mock server's root path.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config(server: &MockServer) -> ShopifyStorefrontConfig {
    ShopifyStorefrontConfig {
        store: "trend-test.myshopify.com".to_string(),
        api_version: "2026-01".to_string(),
        storefront_token: SecretString::from(TEST_TOKEN),
        endpoint_override: Some(Url::parse(&server.uri()).unwrap()),
    }
}

#[must_use]
pub fn test_client(server: &MockServer) -> StorefrontClient {
    StorefrontClient::new(&test_config(server))
}

/// POST matching a single GraphQL operation.
#[must_use]
pub fn operation(name: &str) -> MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(json!({ "operationName": name })))
}

/// `200` carrying `{"data": data}`.
#[must_use]
pub fn data_response(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

#[must_use]
pub fn money_json(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "USD" })
}

/// A one-variant product node.
#[must_use]
pub fn product_json(id: &str, title: &str, price: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "images": { "edges": [
            { "node": { "url": format!("https://cdn.test/{id}.jpg"), "altText": null } }
        ] },
        "priceRange": {
            "minVariantPrice": money_json(price),
            "maxVariantPrice": money_json(price)
        },
        "variants": { "edges": [
            { "node": {
                "id": format!("{id}-v"),
                "title": "Default Title",
                "availableForSale": true,
                "price": money_json(price),
                "compareAtPrice": null,
                "selectedOptions": [{ "name": "Title", "value": "Default Title" }]
            } }
        ] }
    })
}

#[must_use]
pub fn products_json(products: Vec<Value>) -> Value {
    let edges: Vec<Value> = products.into_iter().map(|node| json!({ "node": node })).collect();
    json!({ "products": { "edges": edges } })
}

/// A cart with one line per `(line_id, variant_id, quantity, unit_price)`.
#[must_use]
pub fn cart_json(id: &str, lines: &[(&str, &str, u32, &str)], total: &str) -> Value {
    let total_quantity: u32 = lines.iter().map(|(_, _, quantity, _)| quantity).sum();
    let edges: Vec<Value> = lines
        .iter()
        .map(|(line_id, variant_id, quantity, price)| {
            json!({ "node": {
                "id": line_id,
                "quantity": quantity,
                "cost": { "amountPerQuantity": money_json(price) },
                "merchandise": {
                    "id": variant_id,
                    "title": "Default Title",
                    "price": money_json(price),
                    "image": null,
                    "product": { "id": "gid://shopify/Product/1", "title": "Linen Shirt" }
                }
            } })
        })
        .collect();
    json!({
        "id": id,
        "checkoutUrl": format!("https://trend-test.myshopify.com/cart/c/{id}"),
        "totalQuantity": total_quantity,
        "cost": {
            "totalAmount": money_json(total),
            "subtotalAmount": money_json(total)
        },
        "lines": { "edges": edges }
    })
}
