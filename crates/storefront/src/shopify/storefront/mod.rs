//! Shopify Storefront API client implementation.
//!
//! Uses the `graphql_client` envelope with `reqwest` 0.13 for HTTP.
//! Caches product and collection lists using `moka` (5-minute TTL); searches
//! and carts are never cached.

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use trend_core::{CartId, CartLineId, ProductId, SortOption, VariantId};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Cart, Collection, Product};
use crate::shopify::{CommerceApi, GraphQLError, GraphQLErrorLocation, ShopifyError};

use cache::CacheValue;
use conversions::{convert_cart, convert_collection, convert_product, convert_user_error};
use queries::fragments::CartMutationPayload;
use queries::{
    AddCartLines, CartLineInput, CreateCart, GetCart, GetCollections, GetProductById, GetProducts,
    RemoveCartLines, UpdateCartLines, add_cart_lines, create_cart, get_cart, get_collections,
    get_product_by_id, get_products, remove_cart_lines, update_cart_lines,
};

/// Header carrying the public Storefront API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides type-safe access to products, collections, and cart operations.
/// Product and collection lists are cached for 5 minutes. Cloning is cheap;
/// clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    cache: Cache<String, CacheValue>,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.storefront_token.clone(),
                cache,
            }),
        }
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::graphql(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::graphql("No data in response")
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the first page of the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, first: i64) -> Result<Vec<Product>, ShopifyError> {
        let cache_key = cache::products_key(first);

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let variables = get_products::Variables {
            first,
            query: None,
            sort_key: None,
            reverse: None,
        };

        let data = self.execute::<GetProducts>(variables).await?;
        let products: Vec<Product> = data.products.into_nodes().map(convert_product).collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_by_id(&self, id: &ProductId) -> Result<Product, ShopifyError> {
        let cache_key = cache::product_key(id.as_str());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_id::Variables {
            id: id.to_string(),
        };

        let data = self.execute::<GetProductById>(variables).await?;

        let product = data
            .product
            .map(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Search products by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        first: i64,
        sort: SortOption,
    ) -> Result<Vec<Product>, ShopifyError> {
        let params = sort.params();
        let variables = get_products::Variables {
            first,
            query: Some(query.to_string()),
            sort_key: Some(params.sort_key),
            reverse: Some(params.reverse),
        };

        let data = self.execute::<GetProducts>(variables).await?;

        Ok(data.products.into_nodes().map(convert_product).collect())
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get the first page of collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(&self, first: i64) -> Result<Vec<Collection>, ShopifyError> {
        let cache_key = cache::collections_key(first);

        if let Some(CacheValue::Collections(collections)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let data = self
            .execute::<GetCollections>(get_collections::Variables { first })
            .await?;
        let collections: Vec<Collection> = data
            .collections
            .into_nodes()
            .map(convert_collection)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Collections(collections.clone()))
            .await;

        Ok(collections)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new cart seeded with one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart creation fails or user errors are returned.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn create_cart(
        &self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput {
                lines: vec![line_input(variant_id, quantity)],
            },
        };

        let data = self.execute::<CreateCart>(variables).await?;
        cart_from_payload(data.cart_create, "Failed to create cart")
    }

    /// Get an existing cart.
    ///
    /// Returns `Ok(None)` when the backend no longer knows the cart (e.g. it
    /// expired after checkout).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        Ok(data.cart.map(convert_cart))
    }

    /// Add a line to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: vec![line_input(variant_id, quantity)],
        };

        let data = self.execute::<AddCartLines>(variables).await?;
        cart_from_payload(data.cart_lines_add, "Failed to add to cart")
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self), fields(cart_id = %cart_id, line_id = %line_id))]
    pub async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: vec![update_cart_lines::CartLineUpdateInput {
                id: line_id.to_string(),
                quantity: i64::from(quantity),
            }],
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;
        cart_from_payload(data.cart_lines_update, "Failed to update cart")
    }

    /// Remove a line from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart update fails or user errors are returned.
    #[instrument(skip(self), fields(cart_id = %cart_id, line_id = %line_id))]
    pub async fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
    ) -> Result<Cart, ShopifyError> {
        let variables = remove_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            line_ids: vec![line_id.to_string()],
        };

        let data = self.execute::<RemoveCartLines>(variables).await?;
        cart_from_payload(data.cart_lines_remove, "Failed to remove from cart")
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

fn line_input(variant_id: &VariantId, quantity: u32) -> CartLineInput {
    CartLineInput {
        merchandise_id: variant_id.to_string(),
        quantity: i64::from(quantity),
    }
}

/// Unwrap a cart mutation payload.
///
/// A non-empty `userErrors` list is a failure even though the transport
/// succeeded.
fn cart_from_payload(
    payload: Option<CartMutationPayload>,
    failure: &str,
) -> Result<Cart, ShopifyError> {
    if let Some(result) = payload {
        if !result.user_errors.is_empty() {
            return Err(ShopifyError::UserError(
                result
                    .user_errors
                    .into_iter()
                    .map(convert_user_error)
                    .collect(),
            ));
        }

        if let Some(cart) = result.cart {
            return Ok(convert_cart(cart));
        }
    }

    Err(ShopifyError::graphql(failure))
}

impl CommerceApi for StorefrontClient {
    async fn get_products(&self, first: i64) -> Result<Vec<Product>, ShopifyError> {
        Self::get_products(self, first).await
    }

    async fn get_product_by_id(&self, id: &ProductId) -> Result<Product, ShopifyError> {
        Self::get_product_by_id(self, id).await
    }

    async fn search_products(
        &self,
        query: &str,
        first: i64,
        sort: SortOption,
    ) -> Result<Vec<Product>, ShopifyError> {
        Self::search_products(self, query, first, sort).await
    }

    async fn get_collections(&self, first: i64) -> Result<Vec<Collection>, ShopifyError> {
        Self::get_collections(self, first).await
    }

    async fn create_cart(
        &self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        Self::create_cart(self, variant_id, quantity).await
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        Self::get_cart(self, cart_id).await
    }

    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        Self::add_cart_lines(self, cart_id, variant_id, quantity).await
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        Self::update_cart_lines(self, cart_id, line_id, quantity).await
    }

    async fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
    ) -> Result<Cart, ShopifyError> {
        Self::remove_cart_lines(self, cart_id, line_id).await
    }
}
