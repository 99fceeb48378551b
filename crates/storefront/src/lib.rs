//! Trend shopping client library.
//!
//! Data and presentation-model layers of the Trend storefront client:
//! a Shopify Storefront API client, the session cart synchronizer, variant
//! resolution, locally stored favorites, and one state holder per screen.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod screens;
pub mod services;
pub mod shopify;

#[cfg(test)]
mod testing;
