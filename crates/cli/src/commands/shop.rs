//! Interactive cart session.
//!
//! Reads one command per line from stdin:
//!
//! ```text
//! add <variant-id> [quantity]   add a variant (creates the cart on first use)
//! update <line-id> <quantity>   set a line's quantity; 0 removes it
//! remove <line-id>              remove a line
//! cart                          show the cart
//! checkout                      place a simulated order
//! quit
//! ```

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use trend_core::{CartLineId, VariantId};
use trend_storefront::config::StorefrontConfig;
use trend_storefront::error::Result;
use trend_storefront::screens::{CartScreen, CheckoutScreen, CheckoutState, UiState};
use trend_storefront::services::CartSynchronizer;
use trend_storefront::shopify::{Cart, StorefrontClient};

use super::print_lines;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Add(VariantId, u32),
    Update(CartLineId, u32),
    Remove(CartLineId),
    Cart,
    Checkout,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let arg = words.next();
    let quantity = words.next();

    let parse_quantity = |raw: Option<&str>, default: Option<u32>| {
        raw.map_or_else(
            || default.ok_or_else(|| "missing quantity".to_string()),
            |q| q.parse::<u32>().map_err(|_| format!("invalid quantity: {q}")),
        )
    };

    match (verb, arg) {
        ("add", Some(id)) => Ok(Command::Add(
            VariantId::new(id),
            parse_quantity(quantity, Some(1))?,
        )),
        ("update", Some(id)) => Ok(Command::Update(
            CartLineId::new(id),
            parse_quantity(quantity, None)?,
        )),
        ("remove", Some(id)) => Ok(Command::Remove(CartLineId::new(id))),
        ("cart", None) => Ok(Command::Cart),
        ("checkout", None) => Ok(Command::Checkout),
        ("quit" | "exit", None) => Ok(Command::Quit),
        ("add" | "update" | "remove", None) => Err(format!("{verb}: missing ID")),
        _ => Err(format!("unknown command: {line}")),
    }
}

fn cart_lines(cart: &Cart) -> Vec<String> {
    let mut lines: Vec<String> = cart
        .lines
        .iter()
        .map(|item| {
            format!(
                "{}  {} ({})  x{}  {}",
                item.id,
                item.product_title,
                item.variant_title,
                item.quantity,
                item.price.formatted()
            )
        })
        .collect();
    lines.push(format!(
        "{} item(s), subtotal {}, total {}",
        cart.total_quantity,
        cart.subtotal_amount.formatted(),
        cart.total_amount.formatted()
    ));
    lines
}

fn show_cart_state(state: &UiState<Option<Cart>>) {
    match state {
        UiState::Loading => {}
        UiState::Success(Some(cart)) => print_lines(cart_lines(cart)),
        UiState::Success(None) => print_lines(["Cart is empty".to_string()]),
        UiState::Error(message) => tracing::warn!("{message}"),
    }
}

/// Run the session until `quit` or end of input.
pub async fn run(config: &StorefrontConfig) -> Result<()> {
    let api = Arc::new(StorefrontClient::new(&config.shopify));
    let cart = Arc::new(CartSynchronizer::new(api));
    let cart_screen = CartScreen::new(Arc::clone(&cart));
    let checkout = CheckoutScreen::new(Arc::clone(&cart), config.checkout_delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Cart session started, type `quit` to leave");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                tracing::warn!("{message}");
                continue;
            }
        };

        match command {
            Command::Add(variant_id, quantity) => {
                match cart.add_to_cart(&variant_id, quantity).await {
                    Ok(updated) => print_lines(cart_lines(&updated)),
                    Err(e) => {
                        e.report();
                        tracing::warn!("{}", e.user_message());
                    }
                }
            }
            Command::Update(line_id, quantity) => {
                cart_screen.update_quantity(&line_id, quantity).await;
                show_cart_state(&cart_screen.state().borrow());
            }
            Command::Remove(line_id) => {
                cart_screen.remove_item(&line_id).await;
                show_cart_state(&cart_screen.state().borrow());
            }
            Command::Cart => {
                cart_screen.load_cart().await;
                show_cart_state(&cart_screen.state().borrow());
            }
            Command::Checkout => {
                checkout.load_summary().await;
                if let CheckoutState::Error(message) = &*checkout.state().borrow() {
                    tracing::warn!("{message}");
                    continue;
                }
                tracing::info!("Processing payment...");
                checkout.place_order().await;
                if let CheckoutState::Success {
                    order_number,
                    total_formatted,
                } = &*checkout.state().borrow()
                {
                    print_lines([format!("Order {order_number} placed, total {total_formatted}")]);
                }
            }
            Command::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_defaults_to_one() {
        assert_eq!(
            parse_command("add gid://shopify/ProductVariant/1"),
            Ok(Command::Add(VariantId::new("gid://shopify/ProductVariant/1"), 1))
        );
    }

    #[test]
    fn test_parse_update_requires_quantity() {
        assert!(parse_command("update line-1").is_err());
        assert_eq!(
            parse_command("update line-1 0"),
            Ok(Command::Update(CartLineId::new("line-1"), 0))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_bad_quantity() {
        assert!(parse_command("dance").is_err());
        assert!(parse_command("add v1 many").is_err());
        assert!(parse_command("remove").is_err());
    }
}
