//! Owned search state: filters, the cached page of results, and the
//! generation counter that keeps overlapping requests from clobbering
//! each other.
//!
//! A request is split in two so it can run on a worker thread:
//! [`SearchStore::prepare`] validates and tags it, [`SearchStore::apply`]
//! takes the result back. Only the newest tag is ever applied.

use crate::api::{Item, MarketClient, SearchPage, Transport};
use crate::error::{Result, SwapboardError};
use crate::search::filters::{FilterUpdate, SearchFilters};
use crate::search::pagination::PageState;
use crate::search::validate::{normalize, validate, ValidationError};
use crate::search::SearchParams;
use tracing::{debug, warn};

/// A validated request tagged with its generation
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub generation: u64,
    pub params: SearchParams,
}

/// What [`SearchStore::apply`] did with a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Results replaced
    Updated { count: usize, total: u64 },
    /// Results cleared; carries the user-facing message
    Failed(String),
    /// The requested page was past the end. Nothing was cached and the
    /// store moved to `page`, which still needs fetching.
    Relocated { page: u32, total: u64 },
    /// A newer request was issued since; nothing changed
    Stale,
}

pub struct SearchStore {
    filters: SearchFilters,
    page: PageState,
    items: Vec<Item>,
    generation: u64,
    in_flight: Option<u64>,
    requested_page: u32,
    last_error: Option<String>,
}

impl SearchStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            filters: SearchFilters::default(),
            page: PageState::new(page_size),
            items: Vec::new(),
            generation: 0,
            in_flight: None,
            requested_page: 1,
            last_error: None,
        }
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.page.total()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Merge new filter values; the next fetch starts from page 1
    pub fn update_filters(&mut self, update: FilterUpdate) {
        if update.is_empty() {
            return;
        }
        self.filters.update(update);
        self.page.reset();
    }

    /// Reset every filter to its default and go back to page 1
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page.reset();
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.page.go_to(page);
    }

    /// Request a page by number without knowing the total yet
    pub fn seek_page(&mut self, page: u32) {
        self.page.seek(page);
    }

    pub fn next_page(&mut self) -> bool {
        self.page.next()
    }

    pub fn previous_page(&mut self) -> bool {
        self.page.previous()
    }

    /// Normalize and validate the filters, then issue a new generation.
    ///
    /// On a validation failure nothing is issued and the cached results are
    /// left alone; the caller shows the error instead of fetching. The
    /// generation still advances so a request already in flight is dropped
    /// rather than applied under the rejected filters.
    pub fn prepare(&mut self) -> std::result::Result<SearchRequest, ValidationError> {
        normalize(&mut self.filters);
        if let Err(e) = validate(&self.filters) {
            debug!(error = %e, "search input rejected");
            self.generation += 1;
            self.in_flight = None;
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.requested_page = self.page.current_page();

        Ok(SearchRequest {
            generation: self.generation,
            params: SearchParams {
                filters: self.filters.clone(),
                page: self.page.current_page(),
                limit: self.page.page_size(),
            },
        })
    }

    /// Accept the result of the request tagged `generation`.
    ///
    /// Results from anything but the newest generation are dropped.
    pub fn apply(&mut self, generation: u64, result: Result<SearchPage>) -> ApplyOutcome {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale search response");
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(page) => self.accept(page),
            Err(e) => ApplyOutcome::Failed(self.fail(&e)),
        }
    }

    /// Prepare, fetch and apply on the calling thread.
    ///
    /// A page past the end is fetched again at the last page that exists.
    /// Each retry asks for a lower page, so this ends by page 1 at the latest.
    pub fn search<T: Transport>(&mut self, client: &MarketClient<T>) -> Result<&[Item]> {
        loop {
            let request = self.prepare()?;
            match client.search(&request.params) {
                Ok(page) => {
                    if let ApplyOutcome::Relocated { .. } = self.accept(page) {
                        continue;
                    }
                    return Ok(&self.items);
                }
                Err(e) => {
                    self.fail(&e);
                    return Err(e);
                }
            }
        }
    }

    fn accept(&mut self, page: SearchPage) -> ApplyOutcome {
        self.in_flight = None;
        self.last_error = None;
        self.page.set_total(page.total);

        if self.page.current_page() != self.requested_page {
            self.items.clear();
            debug!(
                requested = self.requested_page,
                page = self.page.current_page(),
                total = page.total,
                "requested page out of range"
            );
            return ApplyOutcome::Relocated {
                page: self.page.current_page(),
                total: page.total,
            };
        }

        // Items and total change together; nothing observes a half-applied page
        self.items = page.items;

        debug!(count = self.items.len(), total = page.total, "search results applied");
        ApplyOutcome::Updated {
            count: self.items.len(),
            total: page.total,
        }
    }

    fn fail(&mut self, error: &SwapboardError) -> String {
        self.in_flight = None;
        self.items.clear();
        self.page.clear_total();

        let message = error.user_message();
        warn!(error = %error, "search failed");
        self.last_error = Some(message.clone());
        message
    }
}

impl Default for SearchStore {
    fn default() -> Self {
        Self::new(12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::search::SortOrder;

    fn item(id: &str) -> Item {
        serde_json::from_str(&format!(r#"{{"id": "{}", "title": "t{}"}}"#, id, id)).unwrap()
    }

    fn page_of(n: usize, total: u64) -> SearchPage {
        SearchPage {
            items: (0..n).map(|i| item(&format!("item{:04}", i))).collect(),
            total,
        }
    }

    #[test]
    fn applies_newest_result() {
        let mut store = SearchStore::new(12);
        let request = store.prepare().unwrap();
        assert!(store.is_loading());

        let outcome = store.apply(request.generation, Ok(page_of(12, 47)));
        assert_eq!(outcome, ApplyOutcome::Updated { count: 12, total: 47 });
        assert_eq!(store.items().len(), 12);
        assert_eq!(store.page().total_pages(), 4);
        assert!(!store.is_loading());
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut store = SearchStore::new(12);
        let first = store.prepare().unwrap();
        store.update_filters(FilterUpdate::query("bike"));
        let second = store.prepare().unwrap();
        assert!(second.generation > first.generation);

        // Newer request resolves first
        store.apply(second.generation, Ok(page_of(2, 2)));
        let outcome = store.apply(first.generation, Ok(page_of(12, 90)));

        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.total(), 2);
    }

    #[test]
    fn stale_failure_does_not_clear_results() {
        let mut store = SearchStore::new(12);
        let first = store.prepare().unwrap();
        let second = store.prepare().unwrap();
        store.apply(second.generation, Ok(page_of(3, 3)));

        let outcome = store.apply(first.generation, Err(SwapboardError::Timeout));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(store.items().len(), 3);
        assert!(store.last_error().is_none());
    }

    #[test]
    fn failure_clears_previous_results() {
        let mut store = SearchStore::new(12);
        let request = store.prepare().unwrap();
        store.apply(request.generation, Ok(page_of(5, 5)));

        let request = store.prepare().unwrap();
        let outcome = store.apply(request.generation, Err(SwapboardError::Timeout));

        assert_eq!(
            outcome,
            ApplyOutcome::Failed("The request timed out. Please try again.".into())
        );
        assert!(store.items().is_empty());
        assert_eq!(store.total(), 0);
        assert_eq!(store.last_error(), Some("The request timed out. Please try again."));
    }

    #[test]
    fn invalid_input_blocks_the_request() {
        let mut store = SearchStore::new(12);
        let before = store.generation();
        store.update_filters(FilterUpdate::query("<script>"));

        assert_eq!(store.prepare(), Err(ValidationError::QueryCharacters));
        assert_eq!(store.generation(), before + 1);
        assert!(!store.is_loading());
        assert!(store.last_error().is_some());
    }

    #[test]
    fn rejected_input_drops_the_request_in_flight() {
        let mut store = SearchStore::new(12);
        let request = store.prepare().unwrap();
        store.update_filters(FilterUpdate::query("{bad}"));
        assert!(store.prepare().is_err());

        let outcome = store.apply(request.generation, Ok(page_of(12, 47)));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(store.items().is_empty());
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn failure_keeps_the_page_for_a_retry() {
        let mut store = SearchStore::new(12);
        let request = store.prepare().unwrap();
        store.apply(request.generation, Ok(page_of(12, 47)));
        store.go_to_page(3);

        let request = store.prepare().unwrap();
        store.apply(request.generation, Err(SwapboardError::Timeout));
        assert!(store.items().is_empty());
        assert_eq!(store.total(), 0);

        let retry = store.prepare().unwrap();
        assert_eq!(retry.params.page, 3);
    }

    #[test]
    fn page_past_the_end_is_not_cached() {
        let mut store = SearchStore::new(12);
        store.seek_page(10);
        let request = store.prepare().unwrap();
        assert_eq!(request.params.page, 10);

        let outcome = store.apply(request.generation, Ok(page_of(0, 47)));
        assert_eq!(outcome, ApplyOutcome::Relocated { page: 4, total: 47 });
        assert_eq!(store.page().current_page(), 4);
        assert!(store.items().is_empty());

        let request = store.prepare().unwrap();
        assert_eq!(request.params.page, 4);
        let outcome = store.apply(request.generation, Ok(page_of(11, 47)));
        assert_eq!(outcome, ApplyOutcome::Updated { count: 11, total: 47 });
        assert_eq!(store.page().item_range(), Some((37, 47)));
    }

    #[test]
    fn synchronous_search_refetches_the_last_page() {
        let client = MarketClient::new(FakeTransport::with(vec![
            Ok(r#"{"items": [], "total": 47}"#.into()),
            Ok(r#"{"items": [{"id": "abcdefgh01"}, {"id": "abcdefgh02"}], "total": 47}"#.into()),
        ]));
        let mut store = SearchStore::new(12);
        store.seek_page(10);

        let items = store.search(&client).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(store.page().current_page(), 4);

        let requests = client.transport().requests.lock();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].1.contains(&("page", "10".to_string())));
        assert!(requests[1].1.contains(&("page", "4".to_string())));
    }

    #[test]
    fn whitespace_query_searches_everything() {
        let mut store = SearchStore::new(12);
        store.update_filters(FilterUpdate::query("   "));
        let request = store.prepare().unwrap();
        assert_eq!(request.params.filters.query, "");
        assert_eq!(store.filters().query, "");
    }

    #[test]
    fn filter_changes_and_clear_reset_the_page() {
        let mut store = SearchStore::new(10);
        let request = store.prepare().unwrap();
        store.apply(request.generation, Ok(page_of(10, 100)));
        store.go_to_page(7);
        assert_eq!(store.page().current_page(), 7);

        store.update_filters(FilterUpdate::sort(SortOrder::Oldest));
        assert_eq!(store.page().current_page(), 1);

        store.go_to_page(5);
        store.update_filters(FilterUpdate {
            category: Some("books".into()),
            ..Default::default()
        });
        store.clear_filters();
        assert_eq!(store.page().current_page(), 1);
        assert_eq!(*store.filters(), SearchFilters::default());
    }

    #[test]
    fn request_carries_current_page() {
        let mut store = SearchStore::new(12);
        let request = store.prepare().unwrap();
        store.apply(request.generation, Ok(page_of(12, 47)));
        assert!(store.next_page());

        let request = store.prepare().unwrap();
        assert_eq!(request.params.page, 2);
        assert_eq!(request.params.limit, 12);
    }

    #[test]
    fn synchronous_search_round_trip() {
        let client = MarketClient::new(FakeTransport::with(vec![
            Ok(r#"{"items": [{"id": "abcdefgh01"}], "total": 1}"#.into()),
            Err(SwapboardError::Network("refused".into())),
        ]));
        let mut store = SearchStore::new(12);

        let items = store.search(&client).unwrap();
        assert_eq!(items.len(), 1);

        let err = store.search(&client).unwrap_err();
        assert!(matches!(err, SwapboardError::Network(_)));
        assert!(store.items().is_empty());
        assert!(store.last_error().unwrap().contains("Unable to reach"));
    }

    #[test]
    fn synchronous_search_stops_on_bad_input() {
        let client = MarketClient::new(FakeTransport::default());
        let mut store = SearchStore::new(12);
        store.update_filters(FilterUpdate::query("a".repeat(101)));

        let err = store.search(&client).unwrap_err();
        assert!(matches!(err, SwapboardError::Validation(_)));
        assert_eq!(client.transport().request_count(), 0);
    }
}
