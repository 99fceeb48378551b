//! Cart screen.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;
use trend_core::CartLineId;

use super::UiState;
use crate::error::{Result, add_breadcrumb, message_or};
use crate::services::CartSynchronizer;
use crate::shopify::CommerceApi;
use crate::shopify::types::Cart;

/// `Success(None)` means no cart has been created yet.
pub struct CartScreen<A> {
    cart: Arc<CartSynchronizer<A>>,
    state: watch::Sender<UiState<Option<Cart>>>,
}

impl<A: CommerceApi> CartScreen<A> {
    #[must_use]
    pub fn new(cart: Arc<CartSynchronizer<A>>) -> Self {
        Self {
            cart,
            state: watch::channel(UiState::Loading).0,
        }
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<UiState<Option<Cart>>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn item_count(&self) -> watch::Receiver<u32> {
        self.cart.item_count()
    }

    /// Fetch the cart. A cart already on screen stays visible while loading.
    #[instrument(skip(self))]
    pub async fn load_cart(&self) {
        if self.state.borrow().data().is_none() {
            self.state.send_replace(UiState::Loading);
        }
        let result = self.cart.get_cart().await;
        self.apply(result, "Failed to load cart");
    }

    /// Set a line's quantity; zero removes the line.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_quantity(&self, line_id: &CartLineId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(line_id).await;
            return;
        }
        add_breadcrumb("cart", "Update quantity", Some(&[("line_id", line_id.as_str())]));
        let result = self.cart.update_cart_line(line_id, quantity).await.map(Some);
        self.apply(result, "Failed to update quantity");
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: &CartLineId) {
        add_breadcrumb("cart", "Remove item", Some(&[("line_id", line_id.as_str())]));
        let result = self.cart.remove_cart_line(line_id).await.map(Some);
        self.apply(result, "Failed to remove item");
    }

    fn apply(&self, result: Result<Option<Cart>>, fallback: &str) {
        let next = match result {
            Ok(cart) => UiState::Success(cart),
            Err(err) => {
                err.report();
                UiState::Error(message_or(&err, fallback))
            }
        };
        self.state.send_replace(next);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use trend_core::VariantId;

    use super::*;
    use crate::testing::{FakeCommerceApi, simple_product};

    fn screen() -> (
        Arc<FakeCommerceApi>,
        Arc<CartSynchronizer<FakeCommerceApi>>,
        CartScreen<FakeCommerceApi>,
    ) {
        let api = Arc::new(FakeCommerceApi::with_products(vec![
            simple_product("p1", "Linen Shirt", "29.99"),
            simple_product("p2", "Canvas Tote", "15.00"),
        ]));
        let cart = Arc::new(CartSynchronizer::new(Arc::clone(&api)));
        (api, Arc::clone(&cart), CartScreen::new(cart))
    }

    fn shown(screen: &CartScreen<FakeCommerceApi>) -> Cart {
        screen.state().borrow().data().cloned().flatten().unwrap()
    }

    #[tokio::test]
    async fn test_load_without_cart_is_empty_success() {
        let (_api, _cart, screen) = screen();

        screen.load_cart().await;

        assert_eq!(*screen.state().borrow(), UiState::Success(None));
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let (_api, cart, screen) = screen();
        cart.add_to_cart(&VariantId::new("p1-v"), 1).await.unwrap();
        cart.add_to_cart(&VariantId::new("p2-v"), 1).await.unwrap();
        screen.load_cart().await;
        let line = shown(&screen).lines[0].id.clone();

        screen.update_quantity(&line, 3).await;
        assert_eq!(shown(&screen).total_quantity, 4);
        assert_eq!(*screen.item_count().borrow(), 4);

        screen.remove_item(&line).await;
        assert_eq!(shown(&screen).lines.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_quantity_removes_line() {
        let (api, cart, screen) = screen();
        cart.add_to_cart(&VariantId::new("p1-v"), 2).await.unwrap();
        screen.load_cart().await;
        let line = shown(&screen).lines[0].id.clone();

        screen.update_quantity(&line, 0).await;

        assert!(shown(&screen).is_empty());
        assert_eq!(api.call_count("update_cart_lines"), 0);
        assert_eq!(api.call_count("remove_cart_lines"), 1);
    }

    #[tokio::test]
    async fn test_update_without_cart_is_error() {
        let (_api, _cart, screen) = screen();

        screen
            .update_quantity(&CartLineId::new("gid://shopify/CartLine/1"), 2)
            .await;

        assert_eq!(screen.state().borrow().error(), Some("No active cart"));
    }

    #[tokio::test]
    async fn test_rejected_update_shows_backend_message() {
        let (api, cart, screen) = screen();
        cart.add_to_cart(&VariantId::new("p1-v"), 1).await.unwrap();
        screen.load_cart().await;
        let line = shown(&screen).lines[0].id.clone();
        api.state().reject_mutations = Some("Only 2 items left".to_string());

        screen.update_quantity(&line, 5).await;

        assert_eq!(screen.state().borrow().error(), Some("Only 2 items left"));
        assert_eq!(*screen.item_count().borrow(), 1);
    }
}
