//! Catalog sort options and client-side price filtering.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort keys understood by the storefront product search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    /// Sort by title.
    Title,
    /// Sort by creation date.
    CreatedAt,
    /// Sort by price.
    Price,
    /// Sort by relevance (for search).
    Relevance,
}

/// Sort choices offered to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Relevance,
    PriceLowToHigh,
    PriceHighToLow,
    Newest,
    TitleAz,
}

/// Backend sort parameters for a [`SortOption`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortParams {
    pub sort_key: ProductSortKey,
    pub reverse: bool,
}

impl SortOption {
    /// All options in display order.
    pub const ALL: [Self; 5] = [
        Self::Relevance,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Newest,
        Self::TitleAz,
    ];

    /// Label shown in the sort picker.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::PriceHighToLow => "Price: High to Low",
            Self::Newest => "Newest",
            Self::TitleAz => "Title: A-Z",
        }
    }

    /// Sort key and direction to send to the backend.
    #[must_use]
    pub const fn params(self) -> SortParams {
        let (sort_key, reverse) = match self {
            Self::Relevance => (ProductSortKey::Relevance, false),
            Self::PriceLowToHigh => (ProductSortKey::Price, false),
            Self::PriceHighToLow => (ProductSortKey::Price, true),
            Self::Newest => (ProductSortKey::CreatedAt, true),
            Self::TitleAz => (ProductSortKey::Title, false),
        };
        SortParams { sort_key, reverse }
    }

    const fn slug(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceLowToHigh => "price-asc",
            Self::PriceHighToLow => "price-desc",
            Self::Newest => "newest",
            Self::TitleAz => "title",
        }
    }
}

/// Error returned when parsing an unknown sort option.
#[derive(Debug, Error)]
#[error("unknown sort option: {0} (expected relevance, price-asc, price-desc, newest or title)")]
pub struct ParseSortOptionError(String);

impl FromStr for SortOption {
    type Err = ParseSortOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSortOptionError(s.to_owned()))
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Inclusive price bounds applied to search results.
///
/// `max` of `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceFilter {
    pub min: Decimal,
    pub max: Option<Decimal>,
}

impl PriceFilter {
    #[must_use]
    pub const fn new(min: Decimal, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    /// Whether a price falls inside the bounds.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}
