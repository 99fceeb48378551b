//! Reactive favorites backed by `SQLite`.
//!
//! Every write goes through one writer lock, so `toggle`'s read of the
//! current membership and its following write cannot interleave with another
//! write. After each write the full list and the ID set are re-read and
//! republished.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument};
use trend_core::ProductId;

use crate::db::{Favorite, FavoriteRepository};
use crate::error::Result;
use crate::shopify::types::Product;

/// Favorites shared by every screen.
#[derive(Debug)]
pub struct FavoriteStore {
    pool: SqlitePool,
    writer: Mutex<()>,
    favorites: watch::Sender<Vec<Favorite>>,
    ids: watch::Sender<HashSet<ProductId>>,
}

impl FavoriteStore {
    /// Load the current favorites and start publishing them.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial read fails.
    pub async fn open(pool: SqlitePool) -> Result<Self> {
        let repo = FavoriteRepository::new(&pool);
        let (favorites, _) = watch::channel(repo.get_all().await?);
        let (ids, _) = watch::channel(repo.get_all_ids().await?);

        Ok(Self {
            pool,
            writer: Mutex::new(()),
            favorites,
            ids,
        })
    }

    /// Subscribe to all favorites, most recently added first.
    #[must_use]
    pub fn favorites(&self) -> watch::Receiver<Vec<Favorite>> {
        self.favorites.subscribe()
    }

    /// Subscribe to the set of favorite product IDs.
    #[must_use]
    pub fn favorite_ids(&self) -> watch::Receiver<HashSet<ProductId>> {
        self.ids.subscribe()
    }

    /// Membership as of the last completed write.
    #[must_use]
    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.ids.borrow().contains(product_id)
    }

    /// Add the product if it is not a favorite, remove it otherwise.
    ///
    /// Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read or write fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, product: &Product) -> Result<bool> {
        let _guard = self.writer.lock().await;
        let repo = FavoriteRepository::new(&self.pool);

        let now_favorite = if repo.is_favorite(&product.id).await? {
            repo.delete(&product.id).await?;
            false
        } else {
            repo.upsert(&Favorite::from_product(product, Utc::now()))
                .await?;
            true
        };

        debug!(favorite = now_favorite, "Toggled favorite");
        self.publish(&repo).await?;
        Ok(now_favorite)
    }

    /// Remove a favorite. Removing a missing favorite is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<()> {
        let _guard = self.writer.lock().await;
        let repo = FavoriteRepository::new(&self.pool);

        repo.delete(product_id).await?;
        self.publish(&repo).await
    }

    async fn publish(&self, repo: &FavoriteRepository<'_>) -> Result<()> {
        self.favorites.send_replace(repo.get_all().await?);
        self.ids.send_replace(repo.get_all_ids().await?);
        Ok(())
    }
}
