//! Favorites screen.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use trend_core::ProductId;

use crate::db::Favorite;
use crate::error::Result;
use crate::services::FavoriteStore;
use crate::shopify::types::Product;

pub struct FavoritesScreen {
    favorites: Arc<FavoriteStore>,
}

impl FavoritesScreen {
    #[must_use]
    pub const fn new(favorites: Arc<FavoriteStore>) -> Self {
        Self { favorites }
    }

    /// Saved favorites, most recently added first.
    #[must_use]
    pub fn favorites(&self) -> watch::Receiver<Vec<Favorite>> {
        self.favorites.favorites()
    }

    /// Current favorites as display-only products.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.favorites
            .favorites()
            .borrow()
            .iter()
            .map(Favorite::to_product)
            .collect()
    }

    #[must_use]
    pub fn favorite_ids(&self) -> watch::Receiver<HashSet<ProductId>> {
        self.favorites.favorite_ids()
    }

    /// # Errors
    ///
    /// Returns an error if the favorites database cannot be written.
    pub async fn remove_favorite(&self, product_id: &ProductId) -> Result<()> {
        self.favorites.remove(product_id).await
    }
}
