//! Home screen: product grid and collection carousel.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{instrument, warn};
use trend_core::ProductId;

use super::{COLLECTION_PAGE_SIZE, PRODUCT_PAGE_SIZE, UiState};
use crate::error::{AppError, Result, message_or};
use crate::services::FavoriteStore;
use crate::shopify::CommerceApi;
use crate::shopify::types::{Collection, Product};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeData {
    pub products: Vec<Product>,
    pub collections: Vec<Collection>,
}

pub struct HomeScreen<A> {
    api: Arc<A>,
    favorites: Arc<FavoriteStore>,
    state: watch::Sender<UiState<HomeData>>,
    is_refreshing: watch::Sender<bool>,
}

impl<A: CommerceApi> HomeScreen<A> {
    #[must_use]
    pub fn new(api: Arc<A>, favorites: Arc<FavoriteStore>) -> Self {
        Self {
            api,
            favorites,
            state: watch::channel(UiState::Loading).0,
            is_refreshing: watch::channel(false).0,
        }
    }

    #[must_use]
    pub fn state(&self) -> watch::Receiver<UiState<HomeData>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_refreshing(&self) -> watch::Receiver<bool> {
        self.is_refreshing.subscribe()
    }

    #[must_use]
    pub fn favorite_ids(&self) -> watch::Receiver<HashSet<ProductId>> {
        self.favorites.favorite_ids()
    }

    /// Fetch products and collections concurrently.
    ///
    /// Only when both fail is the screen an error; a single failure shows
    /// the other half with an empty list in its place.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        self.state.send_replace(UiState::Loading);

        let (products, collections) = self.fetch().await;

        let next = match (products, collections) {
            (Err(err), Err(_)) => UiState::Error(message_or(&err, "Failed to load")),
            (products, collections) => UiState::Success(HomeData {
                products: products.unwrap_or_default(),
                collections: collections.unwrap_or_default(),
            }),
        };
        self.state.send_replace(next);
    }

    /// Refetch both halves, keeping the previous data for a half that fails.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        self.is_refreshing.send_replace(true);

        let (products, collections) = self.fetch().await;
        let previous = self.state.borrow().data().cloned().unwrap_or_default();

        self.state.send_replace(UiState::Success(HomeData {
            products: products.unwrap_or(previous.products),
            collections: collections.unwrap_or(previous.collections),
        }));
        self.is_refreshing.send_replace(false);
    }

    /// Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the favorites database cannot be written.
    pub async fn toggle_favorite(&self, product: &Product) -> Result<bool> {
        self.favorites.toggle(product).await
    }

    async fn fetch(&self) -> (Result<Vec<Product>>, Result<Vec<Collection>>) {
        let (products, collections) = tokio::join!(
            self.api.get_products(PRODUCT_PAGE_SIZE),
            self.api.get_collections(COLLECTION_PAGE_SIZE)
        );

        let products = products.map_err(AppError::from);
        let collections = collections.map_err(AppError::from);

        for err in [products.as_ref().err(), collections.as_ref().err()]
            .into_iter()
            .flatten()
        {
            warn!(error = %err, "Home fetch failed");
            err.report();
        }

        (products, collections)
    }
}
