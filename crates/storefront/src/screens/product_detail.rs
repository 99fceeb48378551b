//! Product detail screen: variant selection, quantity, add to cart.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::instrument;
use trend_core::ProductId;

use super::UiState;
use crate::error::{AppError, Result, add_breadcrumb, message_or};
use crate::services::{CartSynchronizer, FavoriteStore, OptionGroup, VariantResolver};
use crate::shopify::CommerceApi;
use crate::shopify::types::{Product, ProductVariant};

/// Largest quantity the stepper allows.
pub const MAX_QUANTITY: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToCartState {
    Idle,
    Loading,
    Success,
    Error(String),
}

pub struct ProductDetailScreen<A> {
    api: Arc<A>,
    cart: Arc<CartSynchronizer<A>>,
    favorites: Arc<FavoriteStore>,
    product_id: watch::Sender<Option<ProductId>>,
    state: watch::Sender<UiState<Product>>,
    resolver: Mutex<Option<VariantResolver>>,
    option_groups: watch::Sender<Vec<OptionGroup>>,
    selected_options: watch::Sender<HashMap<String, String>>,
    selected_variant: watch::Sender<Option<ProductVariant>>,
    quantity: watch::Sender<u32>,
    add_to_cart_state: watch::Sender<AddToCartState>,
}

impl<A: CommerceApi> ProductDetailScreen<A> {
    #[must_use]
    pub fn new(
        api: Arc<A>,
        cart: Arc<CartSynchronizer<A>>,
        favorites: Arc<FavoriteStore>,
    ) -> Self {
        Self {
            api,
            cart,
            favorites,
            product_id: watch::channel(None).0,
            state: watch::channel(UiState::Loading).0,
            resolver: Mutex::new(None),
            option_groups: watch::channel(Vec::new()).0,
            selected_options: watch::channel(HashMap::new()).0,
            selected_variant: watch::channel(None).0,
            quantity: watch::channel(1).0,
            add_to_cart_state: watch::channel(AddToCartState::Idle).0,
        }
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<UiState<Product>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn option_groups(&self) -> watch::Receiver<Vec<OptionGroup>> {
        self.option_groups.subscribe()
    }

    #[must_use]
    pub fn selected_options(&self) -> watch::Receiver<HashMap<String, String>> {
        self.selected_options.subscribe()
    }

    #[must_use]
    pub fn selected_variant(&self) -> watch::Receiver<Option<ProductVariant>> {
        self.selected_variant.subscribe()
    }

    #[must_use]
    pub fn quantity(&self) -> watch::Receiver<u32> {
        self.quantity.subscribe()
    }

    #[must_use]
    pub fn add_to_cart_state(&self) -> watch::Receiver<AddToCartState> {
        self.add_to_cart_state.subscribe()
    }

    #[must_use]
    pub fn favorite_ids(&self) -> watch::Receiver<HashSet<ProductId>> {
        self.favorites.favorite_ids()
    }

    /// Whether the requested product is a favorite.
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.product_id
            .borrow()
            .as_ref()
            .is_some_and(|id| self.favorites.is_favorite(id))
    }

    /// Fetch a product and select its initial variant.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn load_product(&self, id: &ProductId) {
        self.product_id.send_replace(Some(id.clone()));
        self.state.send_replace(UiState::Loading);

        match self.api.get_product_by_id(id).await {
            Ok(product) => {
                self.set_resolver(Some(VariantResolver::new(product.variants.clone())));
                self.state.send_replace(UiState::Success(product));
            }
            Err(err) => {
                let err = AppError::from(err);
                err.report();
                self.set_resolver(None);
                self.state
                    .send_replace(UiState::Error(message_or(&err, "Failed to load product")));
            }
        }
    }

    /// Choose a value in one option group. Ignored until a product is loaded.
    pub fn select_option(&self, name: &str, value: &str) {
        self.with_resolver(|resolver| {
            resolver.select_option(name, value);
        });
    }

    pub fn select_variant(&self, variant: &ProductVariant) {
        self.with_resolver(|resolver| {
            resolver.select_variant(variant);
        });
    }

    pub fn increase_quantity(&self) {
        self.quantity.send_modify(|q| *q = (*q + 1).min(MAX_QUANTITY));
    }

    pub fn decrease_quantity(&self) {
        self.quantity.send_modify(|q| *q = q.saturating_sub(1).max(1));
    }

    /// Add the selected variant in the chosen quantity.
    ///
    /// Does nothing without a selected variant. On success the quantity
    /// goes back to 1.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self) {
        let selected = self.selected_variant.borrow().clone();
        let Some(variant) = selected else {
            return;
        };
        let quantity = *self.quantity.borrow();

        self.add_to_cart_state.send_replace(AddToCartState::Loading);
        add_breadcrumb(
            "cart",
            "Add to cart",
            Some(&[("variant_id", variant.id.as_str())]),
        );

        match self.cart.add_to_cart(&variant.id, quantity).await {
            Ok(_) => {
                self.add_to_cart_state.send_replace(AddToCartState::Success);
                self.quantity.send_replace(1);
            }
            Err(err) => {
                err.report();
                self.add_to_cart_state.send_replace(AddToCartState::Error(message_or(
                    &err,
                    "Failed to add to cart",
                )));
            }
        }
    }

    pub fn reset_add_to_cart_state(&self) {
        self.add_to_cart_state.send_replace(AddToCartState::Idle);
    }

    /// Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidState` before a product has loaded, or an
    /// error if the favorites database cannot be written.
    pub async fn toggle_favorite(&self) -> Result<bool> {
        let product = self
            .state
            .borrow()
            .data()
            .cloned()
            .ok_or_else(|| AppError::InvalidState("No product loaded".to_string()))?;
        self.favorites.toggle(&product).await
    }

    fn set_resolver(&self, resolver: Option<VariantResolver>) {
        let mut slot = self.resolver.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = resolver;
        self.publish(slot.as_ref());
    }

    fn with_resolver(&self, f: impl FnOnce(&mut VariantResolver)) {
        let mut slot = self.resolver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resolver) = slot.as_mut() {
            f(resolver);
        }
        self.publish(slot.as_ref());
    }

    fn publish(&self, resolver: Option<&VariantResolver>) {
        self.option_groups
            .send_replace(resolver.map(|r| r.option_groups().to_vec()).unwrap_or_default());
        self.selected_options
            .send_replace(resolver.map(|r| r.selected_options().clone()).unwrap_or_default());
        self.selected_variant
            .send_replace(resolver.and_then(|r| r.selected_variant().cloned()));
    }
}
