//! Monetary amounts as exact decimal text.
//!
//! The storefront returns amounts as decimal strings. They are kept as text
//! and only parsed into [`Decimal`] for display or comparison, so no amount
//! ever passes through a binary floating-point type.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub fn new(amount: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency_code: currency_code.into(),
        }
    }

    /// The amount as a decimal, or zero when the text is not a number.
    #[must_use]
    pub fn decimal(&self) -> Decimal {
        parse_amount(&self.amount)
    }

    /// Display string for this amount (e.g. `$29.99`, `15.00€`).
    #[must_use]
    pub fn formatted(&self) -> String {
        format_money(&self.amount, &self.currency_code)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

/// Parse a decimal amount, treating anything unparsable as zero.
#[must_use]
pub fn parse_amount(amount: &str) -> Decimal {
    let trimmed = amount.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Format an amount for display in the given currency.
///
/// Known currencies get their symbol in the conventional position; unknown
/// codes fall back to `"<amount> <CODE>"`. Amounts are always shown with two
/// decimals.
#[must_use]
pub fn format_money(amount: &str, currency_code: &str) -> String {
    let mut value =
        parse_amount(amount).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);

    match currency_code {
        "USD" => format!("${value}"),
        "EUR" => format!("{value}\u{20AC}"),
        "TRY" => format!("{value}\u{20BA}"),
        "GBP" => format!("\u{00A3}{value}"),
        other => format!("{value} {other}"),
    }
}
