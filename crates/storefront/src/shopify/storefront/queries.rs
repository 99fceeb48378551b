//! GraphQL operation definitions for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] plus a
//! snake_case module holding its document, `Variables` and `ResponseData`,
//! mirroring the layout `graphql_client` codegen produces. Selection sets
//! shared between operations live in [`fragments`].

use graphql_client::{GraphQLQuery, QueryBody};

// Fragment documents. Kept as macros so operations can splice them into
// their document with `concat!`.
macro_rules! money_fields {
    () => {
        "fragment MoneyFields on MoneyV2 { amount currencyCode }\n"
    };
}

macro_rules! product_fields {
    () => {
        concat!(
            "fragment ProductFields on Product {\n",
            "  id title description\n",
            "  images(first: 10) { edges { node { url altText } } }\n",
            "  priceRange { minVariantPrice { ...MoneyFields } maxVariantPrice { ...MoneyFields } }\n",
            "  variants(first: 10) { edges { node {\n",
            "    id title availableForSale\n",
            "    price { ...MoneyFields }\n",
            "    compareAtPrice { ...MoneyFields }\n",
            "    selectedOptions { name value }\n",
            "  } } }\n",
            "}\n",
            money_fields!()
        )
    };
}

macro_rules! cart_fields {
    () => {
        concat!(
            "fragment CartFields on Cart {\n",
            "  id checkoutUrl totalQuantity\n",
            "  cost { totalAmount { ...MoneyFields } subtotalAmount { ...MoneyFields } }\n",
            "  lines(first: 50) { edges { node {\n",
            "    id quantity\n",
            "    cost { amountPerQuantity { ...MoneyFields } }\n",
            "    merchandise { ... on ProductVariant {\n",
            "      id title\n",
            "      price { ...MoneyFields }\n",
            "      image { url }\n",
            "      product { id title }\n",
            "    } }\n",
            "  } } }\n",
            "}\n",
            money_fields!()
        )
    };
}

macro_rules! cart_payload {
    () => {
        "cart { ...CartFields } userErrors { field message }"
    };
}

/// Implement [`GraphQLQuery`] for an operation struct backed by its module.
macro_rules! graphql_operation {
    ($operation:ident, $module:ident) => {
        impl GraphQLQuery for $operation {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Shared selection sets
// =============================================================================

pub mod fragments {
    use serde::Deserialize;

    /// `MoneyV2` selection.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoneyFields {
        pub amount: String,
        pub currency_code: String,
    }

    /// Relay-style connection wrapper.
    #[derive(Debug, Clone, Deserialize)]
    pub struct Connection<T> {
        pub edges: Vec<Edge<T>>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Edge<T> {
        pub node: T,
    }

    impl<T> Connection<T> {
        pub fn into_nodes(self) -> impl Iterator<Item = T> {
            self.edges.into_iter().map(|edge| edge.node)
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ImageFields {
        pub url: String,
        #[serde(default)]
        pub alt_text: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRangeFields {
        pub min_variant_price: MoneyFields,
        pub max_variant_price: MoneyFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SelectedOptionFields {
        pub name: String,
        pub value: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantFields {
        pub id: String,
        pub title: String,
        pub available_for_sale: bool,
        pub price: MoneyFields,
        #[serde(default)]
        pub compare_at_price: Option<MoneyFields>,
        #[serde(default)]
        pub selected_options: Vec<SelectedOptionFields>,
    }

    /// `ProductFields` fragment.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductFields {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub images: Connection<ImageFields>,
        pub price_range: PriceRangeFields,
        pub variants: Connection<VariantFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionImageFields {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionFields {
        pub id: String,
        pub title: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub image: Option<CollectionImageFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartCostFields {
        pub total_amount: MoneyFields,
        pub subtotal_amount: MoneyFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineCostFields {
        pub amount_per_quantity: MoneyFields,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MerchandiseImageFields {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MerchandiseProductFields {
        pub id: String,
        pub title: String,
    }

    /// `merchandise { ... on ProductVariant }` selection.
    ///
    /// Every field is optional: non-variant merchandise comes back as an
    /// empty object.
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct MerchandiseFields {
        #[serde(default)]
        pub id: Option<String>,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub price: Option<MoneyFields>,
        #[serde(default)]
        pub image: Option<MerchandiseImageFields>,
        #[serde(default)]
        pub product: Option<MerchandiseProductFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CartLineFields {
        pub id: String,
        pub quantity: i64,
        pub cost: CartLineCostFields,
        #[serde(default)]
        pub merchandise: MerchandiseFields,
    }

    /// `CartFields` fragment.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartFields {
        pub id: String,
        pub checkout_url: String,
        pub total_quantity: i64,
        pub cost: CartCostFields,
        pub lines: Connection<CartLineFields>,
    }

    /// `userErrors { field message }` selection.
    #[derive(Debug, Clone, Deserialize)]
    pub struct UserErrorFields {
        #[serde(default)]
        pub field: Option<Vec<String>>,
        pub message: String,
    }

    /// Payload shared by every cart mutation.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartMutationPayload {
        #[serde(default)]
        pub cart: Option<CartFields>,
        #[serde(default)]
        pub user_errors: Vec<UserErrorFields>,
    }
}

// =============================================================================
// Product queries
// =============================================================================

pub struct GetProducts;
graphql_operation!(GetProducts, get_products);

pub mod get_products {
    use serde::{Deserialize, Serialize};
    use trend_core::ProductSortKey;

    use super::fragments::{Connection, ProductFields};

    pub const OPERATION_NAME: &str = "GetProducts";
    pub const QUERY: &str = concat!(
        "query GetProducts($first: Int!, $query: String, $sortKey: ProductSortKeys, $reverse: Boolean) {\n",
        "  products(first: $first, query: $query, sortKey: $sortKey, reverse: $reverse) {\n",
        "    edges { node { ...ProductFields } }\n",
        "  }\n",
        "}\n",
        product_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub query: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub sort_key: Option<ProductSortKey>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reverse: Option<bool>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductFields>,
    }
}

pub struct GetProductById;
graphql_operation!(GetProductById, get_product_by_id);

pub mod get_product_by_id {
    use serde::{Deserialize, Serialize};

    use super::fragments::ProductFields;

    pub const OPERATION_NAME: &str = "GetProductById";
    pub const QUERY: &str = concat!(
        "query GetProductById($id: ID!) {\n",
        "  product(id: $id) { ...ProductFields }\n",
        "}\n",
        product_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub product: Option<ProductFields>,
    }
}

// =============================================================================
// Collection queries
// =============================================================================

pub struct GetCollections;
graphql_operation!(GetCollections, get_collections);

pub mod get_collections {
    use serde::{Deserialize, Serialize};

    use super::fragments::{CollectionFields, Connection};

    pub const OPERATION_NAME: &str = "GetCollections";
    pub const QUERY: &str = concat!(
        "query GetCollections($first: Int!) {\n",
        "  collections(first: $first) {\n",
        "    edges { node { id title description image { url } } }\n",
        "  }\n",
        "}\n"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: Connection<CollectionFields>,
    }
}

// =============================================================================
// Cart queries and mutations
// =============================================================================

pub struct GetCart;
graphql_operation!(GetCart, get_cart);

pub mod get_cart {
    use serde::{Deserialize, Serialize};

    use super::fragments::CartFields;

    pub const OPERATION_NAME: &str = "GetCart";
    pub const QUERY: &str = concat!(
        "query GetCart($cartId: ID!) {\n",
        "  cart(id: $cartId) { ...CartFields }\n",
        "}\n",
        cart_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        #[serde(default)]
        pub cart: Option<CartFields>,
    }
}

/// Line input shared by `cartCreate` and `cartLinesAdd`.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: i64,
}

pub struct CreateCart;
graphql_operation!(CreateCart, create_cart);

pub mod create_cart {
    use serde::{Deserialize, Serialize};

    use super::CartLineInput;
    use super::fragments::CartMutationPayload;

    pub const OPERATION_NAME: &str = "CreateCart";
    pub const QUERY: &str = concat!(
        "mutation CreateCart($input: CartInput!) {\n",
        "  cartCreate(input: $input) { ",
        cart_payload!(),
        " }\n",
        "}\n",
        cart_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_create: Option<CartMutationPayload>,
    }
}

pub struct AddCartLines;
graphql_operation!(AddCartLines, add_cart_lines);

pub mod add_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::CartLineInput;
    use super::fragments::CartMutationPayload;

    pub const OPERATION_NAME: &str = "AddCartLines";
    pub const QUERY: &str = concat!(
        "mutation AddCartLines($cartId: ID!, $lines: [CartLineInput!]!) {\n",
        "  cartLinesAdd(cartId: $cartId, lines: $lines) { ",
        cart_payload!(),
        " }\n",
        "}\n",
        cart_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_lines_add: Option<CartMutationPayload>,
    }
}

pub struct UpdateCartLines;
graphql_operation!(UpdateCartLines, update_cart_lines);

pub mod update_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::fragments::CartMutationPayload;

    pub const OPERATION_NAME: &str = "UpdateCartLines";
    pub const QUERY: &str = concat!(
        "mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {\n",
        "  cartLinesUpdate(cartId: $cartId, lines: $lines) { ",
        cart_payload!(),
        " }\n",
        "}\n",
        cart_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct CartLineUpdateInput {
        pub id: String,
        pub quantity: i64,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_lines_update: Option<CartMutationPayload>,
    }
}

pub struct RemoveCartLines;
graphql_operation!(RemoveCartLines, remove_cart_lines);

pub mod remove_cart_lines {
    use serde::{Deserialize, Serialize};

    use super::fragments::CartMutationPayload;

    pub const OPERATION_NAME: &str = "RemoveCartLines";
    pub const QUERY: &str = concat!(
        "mutation RemoveCartLines($cartId: ID!, $lineIds: [ID!]!) {\n",
        "  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) { ",
        cart_payload!(),
        " }\n",
        "}\n",
        cart_fields!()
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        #[serde(default)]
        pub cart_lines_remove: Option<CartMutationPayload>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_include_their_fragments() {
        assert!(get_products::QUERY.contains("fragment ProductFields on Product"));
        assert!(get_products::QUERY.contains("fragment MoneyFields on MoneyV2"));
        assert!(create_cart::QUERY.contains("fragment CartFields on Cart"));
        assert!(create_cart::QUERY.contains("userErrors { field message }"));
        assert!(!get_collections::QUERY.contains("fragment"));
    }

    #[test]
    fn test_build_query_sets_operation_name() {
        let body = RemoveCartLines::build_query(remove_cart_lines::Variables {
            cart_id: "gid://shopify/Cart/1".to_string(),
            line_ids: vec!["gid://shopify/CartLine/2".to_string()],
        });
        assert_eq!(body.operation_name, "RemoveCartLines");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["cartId"], "gid://shopify/Cart/1");
        assert_eq!(json["variables"]["lineIds"][0], "gid://shopify/CartLine/2");
        assert_eq!(json["operationName"], "RemoveCartLines");
    }

    #[test]
    fn test_search_variables_serialize_sort_key() {
        let variables = get_products::Variables {
            first: 20,
            query: Some("shirt".to_string()),
            sort_key: Some(trend_core::ProductSortKey::CreatedAt),
            reverse: Some(true),
        };
        let json = serde_json::to_value(&variables).unwrap();
        assert_eq!(json["sortKey"], "CREATED_AT");
        assert_eq!(json["reverse"], true);
        assert_eq!(json["query"], "shirt");
    }

    #[test]
    fn test_list_variables_omit_unset_search_fields() {
        let variables = get_products::Variables {
            first: 20,
            query: None,
            sort_key: None,
            reverse: None,
        };
        let json = serde_json::to_value(&variables).unwrap();
        assert_eq!(json, serde_json::json!({ "first": 20 }));
    }
}
