//! Simulated checkout.
//!
//! No payment is taken: placing an order waits for a fixed delay, issues a
//! random order number, and forgets the local cart. The remote cart is left
//! for the hosted checkout to expire.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::error::{add_breadcrumb, message_or};
use crate::services::CartSynchronizer;
use crate::shopify::CommerceApi;
use crate::shopify::types::Cart;

/// Simulated payment processing time.
pub const DEFAULT_CHECKOUT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Loading,
    Summary(Cart),
    Processing,
    Success {
        order_number: String,
        total_formatted: String,
    },
    Error(String),
}

pub struct CheckoutScreen<A> {
    cart: Arc<CartSynchronizer<A>>,
    delay: Duration,
    state: watch::Sender<CheckoutState>,
}

impl<A: CommerceApi> CheckoutScreen<A> {
    #[must_use]
    pub fn new(cart: Arc<CartSynchronizer<A>>, delay: Duration) -> Self {
        Self {
            cart,
            delay,
            state: watch::channel(CheckoutState::Loading).0,
        }
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// Show the cart summary, or an error when there is nothing to buy.
    #[instrument(skip(self))]
    pub async fn load_summary(&self) {
        let next = match self.cart.get_cart().await {
            Ok(Some(cart)) if !cart.is_empty() => CheckoutState::Summary(cart),
            Ok(_) => CheckoutState::Error("Cart is empty".to_string()),
            Err(err) => {
                err.report();
                CheckoutState::Error(message_or(&err, "Failed to load cart"))
            }
        };
        self.state.send_replace(next);
    }

    /// Place the order shown in the summary. Ignored in any other state.
    #[instrument(skip(self))]
    pub async fn place_order(&self) {
        let current = self.state.borrow().clone();
        let CheckoutState::Summary(cart) = current else {
            return;
        };

        add_breadcrumb("checkout", "Place order", Some(&[("cart_id", cart.id.as_str())]));
        self.state.send_replace(CheckoutState::Processing);
        tokio::time::sleep(self.delay).await;

        let order_number = generate_order_number();
        info!(order_number = %order_number, "Order placed");
        self.state.send_replace(CheckoutState::Success {
            order_number,
            total_formatted: cart.total_amount.formatted(),
        });

        self.cart.clear_local_cart().await;
    }
}

/// `TRD-` followed by six random digits.
fn generate_order_number() -> String {
    let digits: u32 = rand::rng().random_range(100_000..=999_999);
    format!("TRD-{digits}")
}
