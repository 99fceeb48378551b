//! Session cart synchronization.
//!
//! [`CartSynchronizer`] owns the single active cart ID for a session and the
//! item-count signal every cart badge observes. Operations are serialized:
//! the lock guarding the cart ID is held across the backend round trip, so at
//! most one request is in flight and the count always reflects the last
//! completed command in issue order.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};
use trend_core::{CartId, CartLineId, VariantId};

use crate::error::{AppError, Result};
use crate::shopify::CommerceApi;
use crate::shopify::types::Cart;

/// Keeps one remote cart per session consistent with a local item count.
pub struct CartSynchronizer<A> {
    api: Arc<A>,
    cart_id: Mutex<Option<CartId>>,
    item_count: watch::Sender<u32>,
}

impl<A> std::fmt::Debug for CartSynchronizer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("item_count", &*self.item_count.borrow())
            .finish_non_exhaustive()
    }
}

impl<A: CommerceApi> CartSynchronizer<A> {
    /// Create a synchronizer with no active cart.
    #[must_use]
    pub fn new(api: Arc<A>) -> Self {
        let (item_count, _) = watch::channel(0);
        Self {
            api,
            cart_id: Mutex::new(None),
            item_count,
        }
    }

    /// Subscribe to the cart item count.
    ///
    /// New subscribers immediately see the latest value.
    #[must_use]
    pub fn item_count(&self) -> watch::Receiver<u32> {
        self.item_count.subscribe()
    }

    /// The latest published item count.
    #[must_use]
    pub fn current_item_count(&self) -> u32 {
        *self.item_count.borrow()
    }

    /// The active cart ID, once a cart exists.
    ///
    /// Waits for an in-flight operation to finish.
    pub async fn cart_id(&self) -> Option<CartId> {
        self.cart_id.lock().await.clone()
    }

    /// Create a new remote cart seeded with one line and make it active.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the line or the request fails.
    /// No cart ID is stored in that case.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn create_cart(&self, variant_id: &VariantId, quantity: u32) -> Result<Cart> {
        let mut active = self.cart_id.lock().await;
        self.create_locked(&mut active, variant_id, quantity).await
    }

    /// Snapshot of the active cart.
    ///
    /// `Ok(None)` means no cart has been created yet, which is not an error.
    /// A cart the backend no longer knows also yields `Ok(None)`; the local ID
    /// is kept until [`Self::clear_local_cart`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Option<Cart>> {
        let active = self.cart_id.lock().await;
        let Some(cart_id) = active.as_ref() else {
            return Ok(None);
        };

        let cart = self.api.get_cart(cart_id).await?;
        match &cart {
            Some(cart) => self.publish(cart),
            None => warn!(cart_id = %cart_id, "Backend no longer knows the active cart"),
        }
        Ok(cart)
    }

    /// Add a line to the active cart, creating the cart first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the line or the request fails.
    /// The published count is unchanged in that case.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add_to_cart(&self, variant_id: &VariantId, quantity: u32) -> Result<Cart> {
        let mut active = self.cart_id.lock().await;
        let Some(cart_id) = active.clone() else {
            debug!("No active cart, creating one");
            return self.create_locked(&mut active, variant_id, quantity).await;
        };

        let cart = self
            .api
            .add_cart_lines(&cart_id, variant_id, quantity)
            .await?;
        self.publish(&cart);
        Ok(cart)
    }

    /// Set the quantity of a line.
    ///
    /// A quantity of zero is passed through unchanged; callers that mean
    /// "remove" should call [`Self::remove_cart_line`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidState` without contacting the backend when no
    /// cart is active; otherwise any backend failure.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_cart_line(&self, line_id: &CartLineId, quantity: u32) -> Result<Cart> {
        let active = self.cart_id.lock().await;
        let cart_id = active.as_ref().ok_or_else(AppError::no_active_cart)?;

        let cart = self
            .api
            .update_cart_lines(cart_id, line_id, quantity)
            .await?;
        self.publish(&cart);
        Ok(cart)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidState` without contacting the backend when no
    /// cart is active; otherwise any backend failure.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_cart_line(&self, line_id: &CartLineId) -> Result<Cart> {
        let active = self.cart_id.lock().await;
        let cart_id = active.as_ref().ok_or_else(AppError::no_active_cart)?;

        let cart = self.api.remove_cart_lines(cart_id, line_id).await?;
        self.publish(&cart);
        Ok(cart)
    }

    /// Forget the active cart and reset the count to zero.
    ///
    /// Purely local: the remote cart is left for the checkout flow to expire.
    #[instrument(skip(self))]
    pub async fn clear_local_cart(&self) {
        let mut active = self.cart_id.lock().await;
        if let Some(cart_id) = active.take() {
            debug!(cart_id = %cart_id, "Cleared local cart");
        }
        self.item_count.send_replace(0);
    }

    async fn create_locked(
        &self,
        active: &mut Option<CartId>,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart> {
        let cart = self.api.create_cart(variant_id, quantity).await?;
        debug!(cart_id = %cart.id, "Created cart");
        *active = Some(cart.id.clone());
        self.publish(&cart);
        Ok(cart)
    }

    fn publish(&self, cart: &Cart) {
        self.item_count.send_replace(cart.total_quantity);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{FakeCommerceApi, simple_product};

    fn synchronizer() -> (Arc<FakeCommerceApi>, CartSynchronizer<FakeCommerceApi>) {
        let api = Arc::new(FakeCommerceApi::with_products(vec![
            simple_product("p1", "Linen Shirt", "29.99"),
            simple_product("p2", "Canvas Tote", "15.00"),
        ]));
        (Arc::clone(&api), CartSynchronizer::new(api))
    }

    fn v(id: &str) -> VariantId {
        VariantId::new(id)
    }

    #[tokio::test]
    async fn test_first_add_creates_and_later_adds_reuse_cart() {
        let (api, sync) = synchronizer();

        let first = sync.add_to_cart(&v("p1-v"), 1).await.unwrap();
        let second = sync.add_to_cart(&v("p2-v"), 2).await.unwrap();
        let third = sync.add_to_cart(&v("p1-v"), 1).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.id, third.id);
        assert_eq!(sync.cart_id().await, Some(first.id));
        assert_eq!(api.call_count("create_cart"), 1);
        assert_eq!(api.call_count("add_cart_lines"), 2);
        assert_eq!(sync.current_item_count(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_adds_create_one_cart() {
        let (api, sync) = synchronizer();

        let (v1, v2) = (v("p1-v"), v("p2-v"));
        let (a, b) = tokio::join!(sync.add_to_cart(&v1, 1), sync.add_to_cart(&v2, 1));

        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(api.call_count("create_cart"), 1);
        assert_eq!(sync.current_item_count(), 2);
    }

    #[tokio::test]
    async fn test_update_and_remove_without_cart_never_call_backend() {
        let (api, sync) = synchronizer();
        let line = CartLineId::new("gid://shopify/CartLine/1");

        let err = sync.update_cart_line(&line, 3).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let err = sync.remove_cart_line(&line).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_cart_without_cart_is_none() {
        let (api, sync) = synchronizer();

        assert!(sync.get_cart().await.unwrap().is_none());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_create_stores_no_id() {
        let (api, sync) = synchronizer();
        api.state().reject_mutations = Some("Variant is sold out".to_string());

        let err = sync.add_to_cart(&v("p1-v"), 1).await.unwrap_err();

        assert_eq!(err.user_message(), "Variant is sold out");
        assert!(sync.cart_id().await.is_none());
        assert_eq!(sync.current_item_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_add_leaves_count_unchanged() {
        let (api, sync) = synchronizer();
        sync.add_to_cart(&v("p1-v"), 2).await.unwrap();

        api.state().reject_mutations = Some("Quantity exceeds stock".to_string());
        let mut count = sync.item_count();
        count.mark_unchanged();

        assert!(sync.add_to_cart(&v("p2-v"), 5).await.is_err());
        assert_eq!(sync.current_item_count(), 2);
        assert!(!count.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_update_and_remove_publish_server_totals() {
        let (_api, sync) = synchronizer();
        let cart = sync.add_to_cart(&v("p1-v"), 1).await.unwrap();
        let line = cart.lines[0].id.clone();

        let cart = sync.update_cart_line(&line, 4).await.unwrap();
        assert_eq!(cart.total_quantity, 4);
        assert_eq!(sync.current_item_count(), 4);

        let cart = sync.remove_cart_line(&line).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(sync.current_item_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_local_cart_resets_without_backend_call() {
        let (api, sync) = synchronizer();
        let first = sync.add_to_cart(&v("p1-v"), 3).await.unwrap();
        let calls_before = api.calls().len();

        sync.clear_local_cart().await;

        assert_eq!(api.calls().len(), calls_before);
        assert!(sync.cart_id().await.is_none());
        assert_eq!(sync.current_item_count(), 0);

        let second = sync.add_to_cart(&v("p2-v"), 1).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_latest_count() {
        let (_api, sync) = synchronizer();
        sync.add_to_cart(&v("p1-v"), 2).await.unwrap();

        let count = sync.item_count();
        assert_eq!(*count.borrow(), 2);
    }
}
