//! Per-screen state holders.
//!
//! Each holder publishes its state through `tokio::sync::watch` channels and
//! accepts commands as async methods. Nothing here renders; a front end
//! subscribes to the receivers and calls the commands.
//!
//! Dropping a command's future cancels it locally. The backend is not told,
//! so a cancelled add-to-cart may still complete server-side.

pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod product_detail;
pub mod search;

pub use cart::CartScreen;
pub use checkout::{CheckoutScreen, CheckoutState};
pub use favorites::FavoritesScreen;
pub use home::{HomeData, HomeScreen};
pub use product_detail::{AddToCartState, ProductDetailScreen};
pub use search::SearchScreen;

/// Products requested for the home grid and each search.
pub const PRODUCT_PAGE_SIZE: i64 = 20;

/// Collections requested for the home carousel and search chips.
pub const COLLECTION_PAGE_SIZE: i64 = 10;

/// Snapshot of a fetch-backed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> UiState<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}
