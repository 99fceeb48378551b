//! In-memory commerce backend and fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use trend_core::{CartId, CartLineId, CollectionId, ProductId, SortOption, VariantId};

use crate::shopify::types::{
    Cart, CartItem, Collection, Image, Money, PriceRange, Product, ProductVariant, SelectedOption,
};
use crate::shopify::{CommerceApi, ShopifyError, UserError};

/// Build a variant from `(name, value)` pairs.
pub fn variant(id: &str, price: &str, available: bool, options: &[(&str, &str)]) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(id),
        title: options
            .iter()
            .map(|(_, value)| *value)
            .collect::<Vec<_>>()
            .join(" / "),
        price: Money::new(price, "USD"),
        compare_at_price: None,
        available_for_sale: available,
        selected_options: options
            .iter()
            .map(|(name, value)| SelectedOption::new(*name, *value))
            .collect(),
    }
}

/// Build a product priced from its first variant.
pub fn product(id: &str, title: &str, variants: Vec<ProductVariant>) -> Product {
    let min = variants
        .first()
        .map_or_else(|| "0.00".to_string(), |v| v.price.amount.clone());
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        images: vec![Image {
            url: format!("https://cdn.example.com/{id}.jpg"),
            alt_text: None,
        }],
        price_range: PriceRange {
            min_variant_price: Money::new(&min, "USD"),
            max_variant_price: Money::new(&min, "USD"),
        },
        variants,
    }
}

/// Product with a single available variant `{id}-v`.
pub fn simple_product(id: &str, title: &str, price: &str) -> Product {
    product(
        id,
        title,
        vec![variant(&format!("{id}-v"), price, true, &[("Title", "Default")])],
    )
}

pub fn collection(id: &str, title: &str) -> Collection {
    Collection {
        id: CollectionId::new(id),
        title: title.to_string(),
        description: String::new(),
        image_url: None,
    }
}

#[derive(Default)]
pub struct FakeState {
    pub products: Vec<Product>,
    pub collections: Vec<Collection>,
    pub fail_products: bool,
    pub fail_collections: bool,
    pub fail_search: bool,
    /// User error returned by every cart mutation while set.
    pub reject_mutations: Option<String>,
    pub carts: HashMap<CartId, Cart>,
    /// Every backend call, by operation name.
    pub calls: Vec<&'static str>,
    /// Queries passed to `search_products`, in order.
    pub searches: Vec<(String, SortOption)>,
    /// Time each search takes before answering.
    pub search_delay: Option<std::time::Duration>,
    next_id: u32,
}

/// Commerce backend that keeps carts in memory.
#[derive(Default)]
pub struct FakeCommerceApi {
    state: Mutex<FakeState>,
}

impl FakeCommerceApi {
    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::default();
        api.state().products = products;
        api
    }

    #[allow(clippy::unwrap_used)]
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) {
        self.state().calls.push(name);
    }

    fn rejection(&self) -> Result<(), ShopifyError> {
        match &self.state().reject_mutations {
            Some(message) => Err(ShopifyError::UserError(vec![UserError {
                field: vec!["lines".to_string()],
                message: message.clone(),
            }])),
            None => Ok(()),
        }
    }

    fn line_for(state: &mut FakeState, variant_id: &VariantId, quantity: u32) -> CartItem {
        state.next_id += 1;
        let owner = state
            .products
            .iter()
            .find(|p| p.variants.iter().any(|v| &v.id == variant_id));
        let found = owner.and_then(|p| p.variants.iter().find(|v| &v.id == variant_id));

        CartItem {
            id: CartLineId::new(format!("gid://shopify/CartLine/{}", state.next_id)),
            quantity,
            variant_id: variant_id.clone(),
            product_id: owner.map_or_else(|| ProductId::new("unknown"), |p| p.id.clone()),
            product_title: owner.map_or_else(String::new, |p| p.title.clone()),
            variant_title: found.map_or_else(String::new, |v| v.title.clone()),
            price: found.map_or_else(|| Money::new("10.00", "USD"), |v| v.price.clone()),
            image_url: None,
        }
    }

    fn recompute(cart: &mut Cart) {
        cart.lines.retain(|line| line.quantity > 0);
        cart.total_quantity = cart.lines.iter().map(|line| line.quantity).sum();
        let total: rust_decimal::Decimal = cart
            .lines
            .iter()
            .map(|line| line.price.decimal() * rust_decimal::Decimal::from(line.quantity))
            .sum();
        cart.total_amount = Money::new(total.round_dp(2).to_string(), "USD");
        cart.subtotal_amount = cart.total_amount.clone();
    }

    fn mutate(
        &self,
        cart_id: &CartId,
        f: impl FnOnce(&mut FakeState, &mut Cart),
    ) -> Result<Cart, ShopifyError> {
        self.rejection()?;
        let mut state = self.state();
        let mut cart = state
            .carts
            .remove(cart_id)
            .ok_or_else(|| ShopifyError::graphql("Cart not found"))?;
        f(&mut *state, &mut cart);
        Self::recompute(&mut cart);
        state.carts.insert(cart_id.clone(), cart.clone());
        Ok(cart)
    }
}

impl CommerceApi for FakeCommerceApi {
    async fn get_products(&self, first: i64) -> Result<Vec<Product>, ShopifyError> {
        self.record("get_products");
        tokio::task::yield_now().await;
        let state = self.state();
        if state.fail_products {
            return Err(ShopifyError::graphql("products unavailable"));
        }
        Ok(state
            .products
            .iter()
            .take(usize::try_from(first).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn get_product_by_id(&self, id: &ProductId) -> Result<Product, ShopifyError> {
        self.record("get_product_by_id");
        tokio::task::yield_now().await;
        self.state()
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {id}")))
    }

    async fn search_products(
        &self,
        query: &str,
        first: i64,
        sort: SortOption,
    ) -> Result<Vec<Product>, ShopifyError> {
        self.record("search_products");
        tokio::task::yield_now().await;
        let delay = self.state().search_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        state.searches.push((query.to_string(), sort));
        if state.fail_search {
            return Err(ShopifyError::graphql("search unavailable"));
        }
        let needle = query.to_lowercase();
        Ok(state
            .products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .take(usize::try_from(first).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn get_collections(&self, first: i64) -> Result<Vec<Collection>, ShopifyError> {
        self.record("get_collections");
        tokio::task::yield_now().await;
        let state = self.state();
        if state.fail_collections {
            return Err(ShopifyError::graphql("collections unavailable"));
        }
        Ok(state
            .collections
            .iter()
            .take(usize::try_from(first).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn create_cart(
        &self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        self.record("create_cart");
        tokio::task::yield_now().await;
        self.rejection()?;
        let mut state = self.state();
        state.next_id += 1;
        let id = CartId::new(format!("gid://shopify/Cart/{}", state.next_id));
        let line = Self::line_for(&mut *state, variant_id, quantity);
        let mut cart = Cart {
            id: id.clone(),
            checkout_url: format!("https://checkout.example.com/{}", id.as_str()),
            lines: vec![line],
            total_amount: Money::new("0.00", "USD"),
            subtotal_amount: Money::new("0.00", "USD"),
            total_quantity: 0,
        };
        Self::recompute(&mut cart);
        state.carts.insert(id, cart.clone());
        Ok(cart)
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        self.record("get_cart");
        tokio::task::yield_now().await;
        Ok(self.state().carts.get(cart_id).cloned())
    }

    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        self.record("add_cart_lines");
        tokio::task::yield_now().await;
        self.mutate(cart_id, |state, cart| {
            if let Some(line) = cart.lines.iter_mut().find(|l| &l.variant_id == variant_id) {
                line.quantity += quantity;
            } else {
                cart.lines.push(Self::line_for(state, variant_id, quantity));
            }
        })
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
        quantity: u32,
    ) -> Result<Cart, ShopifyError> {
        self.record("update_cart_lines");
        tokio::task::yield_now().await;
        self.mutate(cart_id, |_, cart| {
            if let Some(line) = cart.lines.iter_mut().find(|l| &l.id == line_id) {
                line.quantity = quantity;
            }
        })
    }

    async fn remove_cart_lines(
        &self,
        cart_id: &CartId,
        line_id: &CartLineId,
    ) -> Result<Cart, ShopifyError> {
        self.record("remove_cart_lines");
        tokio::task::yield_now().await;
        self.mutate(cart_id, |_, cart| cart.lines.retain(|l| &l.id != line_id))
    }
}
