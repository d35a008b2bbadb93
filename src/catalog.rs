//! The browse-listings page: filter state, the current page of listings, and
//! the re-fetch each accepted filter or page change triggers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{decode_page, ApiError, MarketplaceApi};
use crate::filters::{ListingQuery, PropertyFilters, UrlFilters};
use crate::models::{Pagination, Property};

#[derive(Debug, Default)]
struct CatalogState {
    query: ListingQuery,
    properties: Vec<Property>,
}

pub struct Catalog<A>
where
    A: MarketplaceApi + 'static,
{
    api: Arc<A>,
    state: RwLock<CatalogState>,
    generation: AtomicU64,
}

impl<A> Catalog<A>
where
    A: MarketplaceApi + 'static,
{
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(CatalogState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn properties(&self) -> Vec<Property> {
        self.state.read().await.properties.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.state.read().await.query.pagination()
    }

    pub async fn query(&self) -> ListingQuery {
        self.state.read().await.query.clone()
    }

    /// Edits the filter form. Nothing is fetched until `submit`.
    pub async fn edit_filters<F>(&self, edit: F)
    where
        F: FnOnce(&mut PropertyFilters),
    {
        edit(self.state.write().await.query.draft_mut());
    }

    pub async fn submit(&self) -> Result<bool, ApiError> {
        self.change(ListingQuery::submit).await
    }

    pub async fn clear(&self) -> Result<bool, ApiError> {
        self.change(ListingQuery::clear).await
    }

    pub async fn set_limit(&self, limit: u32) -> Result<bool, ApiError> {
        self.change(|query| query.set_limit(limit)).await
    }

    pub async fn go_to_page(&self, page: u32) -> Result<bool, ApiError> {
        self.change(|query| query.go_to_page(page)).await
    }

    /// Re-syncs from navigation filters; always re-fetches.
    pub async fn sync_from_url(&self, url: &UrlFilters) -> Result<bool, ApiError> {
        self.change(|query| query.sync_from_url(url)).await
    }

    /// Applies `edit` and re-fetches if it asks for it. A failed fetch puts the
    /// query back the way it was.
    async fn change<F>(&self, edit: F) -> Result<bool, ApiError>
    where
        F: FnOnce(&mut ListingQuery) -> bool,
    {
        let (previous, generation) = {
            let mut state = self.state.write().await;
            let previous = state.query.clone();
            if !edit(&mut state.query) {
                return Ok(false);
            }
            (previous, self.next_generation())
        };

        let result = self.fetch(generation).await;
        if result.is_err() {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) == generation {
                debug!(generation, "catalog: restoring query after failed fetch");
                state.query = previous;
            }
        }
        result
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetches the current page. Returns `false` when a newer fetch superseded this one.
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        let generation = self.next_generation();
        self.fetch(generation).await
    }

    async fn fetch(&self, generation: u64) -> Result<bool, ApiError> {
        let (pairs, page) = {
            let state = self.state.read().await;
            (state.query.query_pairs(), state.query.page())
        };
        debug!(generation, ?pairs, "catalog: fetching listings");

        let payload = self.api.list_properties(pairs).await.map_err(|err| {
            warn!(generation, error = %err, "catalog: failed to fetch listings");
            err
        })?;
        let result = decode_page::<Property>(payload, page);

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "catalog: dropping stale listings");
            return Ok(false);
        }

        info!(
            count = result.items.len(),
            page = result.pagination.current_page,
            total_pages = result.pagination.total_pages,
            "catalog: listings loaded"
        );
        state.query.apply_pagination(result.pagination);
        state.properties = result.items;
        Ok(true)
    }
}
