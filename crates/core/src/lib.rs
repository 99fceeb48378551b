//! Trend Core - Shared types library.
//!
//! This crate provides common types used across all Trend components:
//! - `storefront` - Storefront API client, cart synchronization and screen state
//! - `cli` - Command-line driver and favorites database migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money formatting, sort options and price filters

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
