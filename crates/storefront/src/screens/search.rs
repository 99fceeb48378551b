//! Search screen: debounced free-text search, sort, price filter, and
//! collection shortcuts.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};
use trend_core::{CollectionId, PriceFilter, ProductId, SortOption};

use super::{COLLECTION_PAGE_SIZE, PRODUCT_PAGE_SIZE, UiState};
use crate::error::{AppError, Result, message_or};
use crate::services::FavoriteStore;
use crate::shopify::CommerceApi;
use crate::shopify::types::{Collection, Product};

/// Quiet period before a typed query is searched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

struct SearchInner<A> {
    api: Arc<A>,
    favorites: Arc<FavoriteStore>,
    query: watch::Sender<String>,
    raw: watch::Sender<UiState<Vec<Product>>>,
    results: watch::Sender<UiState<Vec<Product>>>,
    sort: watch::Sender<SortOption>,
    price_filter: watch::Sender<PriceFilter>,
    show_filter_sheet: watch::Sender<bool>,
    collections: watch::Sender<Vec<Collection>>,
    selected_collection: watch::Sender<Option<Collection>>,
    preselected: Option<CollectionId>,
    searching: Mutex<()>,
}

/// State holder for the search screen.
///
/// Owns a background task that turns query edits into searches once the
/// query has been stable for the debounce window. The task is aborted when
/// the screen is dropped.
pub struct SearchScreen<A> {
    inner: Arc<SearchInner<A>>,
    debounce: JoinHandle<()>,
}

impl<A: CommerceApi> SearchScreen<A> {
    /// Create the screen and start its debounce task.
    ///
    /// `preselected` is applied once [`Self::load_collections`] finds it.
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(
        api: Arc<A>,
        favorites: Arc<FavoriteStore>,
        debounce: Duration,
        preselected: Option<CollectionId>,
    ) -> Self {
        let inner = Arc::new(SearchInner {
            api,
            favorites,
            query: watch::channel(String::new()).0,
            raw: watch::channel(UiState::Success(Vec::new())).0,
            results: watch::channel(UiState::Success(Vec::new())).0,
            sort: watch::channel(SortOption::default()).0,
            price_filter: watch::channel(PriceFilter::default()).0,
            show_filter_sheet: watch::channel(false).0,
            collections: watch::channel(Vec::new()).0,
            selected_collection: watch::channel(None).0,
            preselected,
            searching: Mutex::new(()),
        });

        let queries = inner.query.subscribe();
        let debounce = tokio::spawn(debounce_queries(Arc::clone(&inner), queries, debounce));

        Self { inner, debounce }
    }

    #[must_use]
    pub fn query(&self) -> watch::Receiver<String> {
        self.inner.query.subscribe()
    }

    /// Search results after the price filter.
    #[must_use]
    pub fn results(&self) -> watch::Receiver<UiState<Vec<Product>>> {
        self.inner.results.subscribe()
    }

    #[must_use]
    pub fn sort_option(&self) -> watch::Receiver<SortOption> {
        self.inner.sort.subscribe()
    }

    #[must_use]
    pub fn price_filter(&self) -> watch::Receiver<PriceFilter> {
        self.inner.price_filter.subscribe()
    }

    #[must_use]
    pub fn show_filter_sheet(&self) -> watch::Receiver<bool> {
        self.inner.show_filter_sheet.subscribe()
    }

    #[must_use]
    pub fn collections(&self) -> watch::Receiver<Vec<Collection>> {
        self.inner.collections.subscribe()
    }

    #[must_use]
    pub fn selected_collection(&self) -> watch::Receiver<Option<Collection>> {
        self.inner.selected_collection.subscribe()
    }

    #[must_use]
    pub fn favorite_ids(&self) -> watch::Receiver<HashSet<ProductId>> {
        self.inner.favorites.favorite_ids()
    }

    /// Record a query edit.
    ///
    /// Non-blank queries are searched by the debounce task; a blank query
    /// clears the results immediately.
    pub fn update_query(&self, query: impl Into<String>) {
        self.inner.set_query(query.into());
    }

    /// Select a collection, searching by its title. `None` clears the
    /// selection without touching the query.
    pub fn select_collection(&self, collection: Option<Collection>) {
        self.inner.select_collection(collection);
    }

    /// Change the sort order, re-searching right away for a non-blank query.
    pub async fn update_sort_option(&self, option: SortOption) {
        self.inner.sort.send_replace(option);
        self.inner.search_current().await;
    }

    pub fn update_price_filter(&self, filter: PriceFilter) {
        self.inner.price_filter.send_replace(filter);
        self.inner.republish();
    }

    pub fn toggle_filter_sheet(&self) {
        self.inner.show_filter_sheet.send_modify(|shown| *shown = !*shown);
    }

    pub fn dismiss_filter_sheet(&self) {
        self.inner.show_filter_sheet.send_replace(false);
    }

    /// Re-run the current query.
    pub async fn retry(&self) {
        self.inner.search_current().await;
    }

    /// Load collection shortcuts and apply the preselected collection.
    ///
    /// A failure leaves the list empty; the screen still works without it.
    #[instrument(skip(self))]
    pub async fn load_collections(&self) {
        match self.inner.api.get_collections(COLLECTION_PAGE_SIZE).await {
            Ok(collections) => {
                let preselected = self.inner.preselected.as_ref().and_then(|id| {
                    collections.iter().find(|c| &c.id == id).cloned()
                });
                self.inner.collections.send_replace(collections);
                if let Some(collection) = preselected {
                    self.inner.select_collection(Some(collection));
                }
            }
            Err(err) => AppError::from(err).report(),
        }
    }

    /// Returns the new membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the favorites database cannot be written.
    pub async fn toggle_favorite(&self, product: &Product) -> Result<bool> {
        self.inner.favorites.toggle(product).await
    }
}

impl<A> Drop for SearchScreen<A> {
    fn drop(&mut self) {
        self.debounce.abort();
    }
}

impl<A: CommerceApi> SearchInner<A> {
    fn set_query(&self, query: String) {
        let blank = query.trim().is_empty();
        self.query.send_if_modified(|current| {
            if *current == query {
                false
            } else {
                *current = query;
                true
            }
        });
        if blank {
            self.raw.send_replace(UiState::Success(Vec::new()));
            self.republish();
        }
    }

    fn select_collection(&self, collection: Option<Collection>) {
        let title = collection.as_ref().map(|c| c.title.clone());
        self.selected_collection.send_replace(collection);
        if let Some(title) = title {
            self.set_query(title);
        }
    }

    async fn search_current(&self) {
        let query = self.query.borrow().clone();
        if !query.trim().is_empty() {
            self.perform_search(&query).await;
        }
    }

    #[instrument(skip(self))]
    async fn perform_search(&self, query: &str) {
        let _serial = self.searching.lock().await;
        let sort = *self.sort.borrow();

        self.raw.send_replace(UiState::Loading);
        self.republish();

        let result = self.api.search_products(query, PRODUCT_PAGE_SIZE, sort).await;

        // The query moved on while this search was in flight
        if *self.query.borrow() != query {
            debug!(query = %query, "Dropping stale search response");
            return;
        }

        let next = match result {
            Ok(products) => UiState::Success(products),
            Err(err) => {
                let err = AppError::from(err);
                err.report();
                UiState::Error(message_or(&err, "Search failed"))
            }
        };

        self.raw.send_replace(next);
        self.republish();
    }

    /// Recompute the visible results from the raw results and the filter.
    fn republish(&self) {
        let filter = *self.price_filter.borrow();
        let visible = match &*self.raw.borrow() {
            UiState::Success(products) => UiState::Success(
                products
                    .iter()
                    .filter(|p| filter.contains(p.price_range.min_variant_price.decimal()))
                    .cloned()
                    .collect(),
            ),
            UiState::Loading => UiState::Loading,
            UiState::Error(message) => UiState::Error(message.clone()),
        };
        self.results.send_replace(visible);
    }
}

/// Search each query once it has been stable for `window`.
async fn debounce_queries<A: CommerceApi>(
    inner: Arc<SearchInner<A>>,
    mut queries: watch::Receiver<String>,
    window: Duration,
) {
    while queries.changed().await.is_ok() {
        loop {
            tokio::select! {
                changed = queries.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                () = tokio::time::sleep(window) => break,
            }
        }

        let query = queries.borrow_and_update().clone();
        if query.trim().is_empty() {
            continue;
        }
        debug!(query = %query, "Debounced search");
        inner.perform_search(&query).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tokio::time::sleep;

    use super::*;
    use crate::db::in_memory_pool;
    use crate::testing::{FakeCommerceApi, collection, simple_product};

    async fn screen(
        preselected: Option<CollectionId>,
    ) -> (Arc<FakeCommerceApi>, SearchScreen<FakeCommerceApi>) {
        let api = Arc::new(FakeCommerceApi::with_products(vec![
            simple_product("p1", "Abc Linen Shirt", "29.99"),
            simple_product("p2", "Abc Canvas Tote", "15.00"),
            simple_product("p3", "Summer Dress", "120.00"),
        ]));
        api.state().collections = vec![collection("c1", "Summer"), collection("c2", "Winter")];
        let favorites = Arc::new(
            FavoriteStore::open(in_memory_pool().await.unwrap())
                .await
                .unwrap(),
        );
        // Pause only once SQLite is open, or the pool's acquire timeout
        // elapses instantly under auto-advance
        tokio::time::pause();
        let screen = SearchScreen::new(Arc::clone(&api), favorites, DEFAULT_DEBOUNCE, preselected);
        (api, screen)
    }

    fn searched(api: &FakeCommerceApi) -> Vec<String> {
        api.state().searches.iter().map(|(q, _)| q.clone()).collect()
    }

    fn result_titles(screen: &SearchScreen<FakeCommerceApi>) -> Vec<String> {
        screen
            .results()
            .borrow()
            .data()
            .unwrap()
            .iter()
            .map(|p| p.title.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_typing_within_window_searches_once() {
        let (api, screen) = screen(None).await;

        screen.update_query("a");
        sleep(Duration::from_millis(100)).await;
        screen.update_query("ab");
        sleep(Duration::from_millis(100)).await;
        screen.update_query("abc");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(searched(&api), vec!["abc"]);
        assert_eq!(result_titles(&screen), vec!["Abc Linen Shirt", "Abc Canvas Tote"]);
    }

    #[tokio::test]
    async fn test_pauses_longer_than_window_search_each_query() {
        let (api, screen) = screen(None).await;

        screen.update_query("ab");
        sleep(Duration::from_millis(400)).await;
        screen.update_query("abc");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(searched(&api), vec!["ab", "abc"]);
    }

    #[tokio::test]
    async fn test_blank_query_clears_without_searching() {
        let (api, screen) = screen(None).await;
        screen.update_query("abc");
        sleep(Duration::from_millis(400)).await;

        screen.update_query("   ");
        sleep(Duration::from_millis(400)).await;

        assert_eq!(searched(&api), vec!["abc"]);
        assert!(result_titles(&screen).is_empty());
    }

    #[tokio::test]
    async fn test_sort_change_researches_immediately() {
        let (api, screen) = screen(None).await;
        screen.update_query("abc");
        sleep(Duration::from_millis(400)).await;

        screen.update_sort_option(SortOption::PriceLowToHigh).await;

        let searches = api.state().searches.clone();
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[1], ("abc".to_string(), SortOption::PriceLowToHigh));
    }

    #[tokio::test]
    async fn test_sort_change_with_blank_query_does_not_search() {
        let (api, screen) = screen(None).await;

        screen.update_sort_option(SortOption::Newest).await;

        assert!(searched(&api).is_empty());
        assert_eq!(*screen.sort_option().borrow(), SortOption::Newest);
    }

    #[tokio::test]
    async fn test_failed_search_then_retry() {
        let (api, screen) = screen(None).await;
        api.state().fail_search = true;
        screen.update_query("abc");
        sleep(Duration::from_millis(400)).await;
        assert_eq!(
            screen.results().borrow().error(),
            Some("GraphQL errors: search unavailable")
        );

        api.state().fail_search = false;
        screen.retry().await;

        assert_eq!(result_titles(&screen).len(), 2);
    }

    #[tokio::test]
    async fn test_price_filter_applies_to_results() {
        let (_api, screen) = screen(None).await;
        screen.update_query("abc");
        sleep(Duration::from_millis(400)).await;

        screen.update_price_filter(PriceFilter::new(Decimal::from(20), Some(Decimal::from(30))));
        assert_eq!(result_titles(&screen), vec!["Abc Linen Shirt"]);

        screen.update_price_filter(PriceFilter::new(Decimal::new(1500, 2), Some(Decimal::new(2999, 2))));
        assert_eq!(result_titles(&screen).len(), 2);
    }

    #[tokio::test]
    async fn test_preselected_collection_searches_its_title() {
        let (api, screen) = screen(Some(CollectionId::new("c1"))).await;

        screen.load_collections().await;
        sleep(Duration::from_millis(400)).await;

        assert_eq!(screen.collections().borrow().len(), 2);
        assert_eq!(
            screen.selected_collection().borrow().as_ref().map(|c| c.title.clone()),
            Some("Summer".to_string())
        );
        assert_eq!(searched(&api), vec!["Summer"]);
        assert_eq!(result_titles(&screen), vec!["Summer Dress"]);
    }

    #[tokio::test]
    async fn test_filter_sheet_visibility() {
        let (_api, screen) = screen(None).await;

        screen.toggle_filter_sheet();
        assert!(*screen.show_filter_sheet().borrow());
        screen.toggle_filter_sheet();
        assert!(!*screen.show_filter_sheet().borrow());
        screen.toggle_filter_sheet();
        screen.dismiss_filter_sheet();
        assert!(!*screen.show_filter_sheet().borrow());
    }

    #[tokio::test]
    async fn test_blank_query_discards_in_flight_search() {
        let (api, screen) = screen(None).await;
        api.state().search_delay = Some(Duration::from_millis(500));

        screen.update_query("abc");
        sleep(Duration::from_millis(350)).await;
        screen.update_query("");
        assert!(result_titles(&screen).is_empty());

        sleep(Duration::from_millis(1000)).await;

        assert_eq!(searched(&api), vec!["abc"]);
        assert!(result_titles(&screen).is_empty());
        assert_eq!(*screen.query().borrow(), "");
    }

    #[tokio::test]
    async fn test_superseded_search_result_is_not_shown() {
        let (api, screen) = screen(None).await;
        api.state().search_delay = Some(Duration::from_millis(500));

        screen.update_query("abc");
        sleep(Duration::from_millis(350)).await;
        screen.update_query("summer");
        sleep(Duration::from_millis(2000)).await;

        assert_eq!(searched(&api), vec!["abc", "summer"]);
        assert_eq!(result_titles(&screen), vec!["Summer Dress"]);
    }

    #[tokio::test]
    async fn test_drop_stops_pending_search() {
        let (api, screen) = screen(None).await;

        screen.update_query("abc");
        drop(screen);
        sleep(Duration::from_millis(400)).await;

        assert!(searched(&api).is_empty());
    }
}
