//! Core types for Trend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod sort;

pub use id::*;
pub use price::{Money, format_money, parse_amount};
pub use sort::{ParseSortOptionError, PriceFilter, ProductSortKey, SortOption, SortParams};
