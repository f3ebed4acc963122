//! Debounced, single-flight movie search.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::flight::Flight;
use crate::models::SearchResult;
use crate::omdb::{OmdbApi, OmdbError};

/// Queries shorter than this (in characters) never reach the network.
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug)]
pub enum SearchEvent {
    Dispatched,
    Resolved(Result<Vec<SearchResult>, OmdbError>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub results: Vec<SearchResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct SearchController {
    api: Arc<dyn OmdbApi>,
    debounce: Duration,
    query: String,
    state: SearchState,
    flight: Flight<SearchEvent>,
}

impl SearchController {
    pub fn new(api: Arc<dyn OmdbApi>, debounce: Duration) -> Self {
        Self {
            api,
            debounce,
            query: String::new(),
            state: SearchState::default(),
            flight: Flight::new(),
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.state.results
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Replaces the query.
    ///
    /// Short queries clear results and error and cancel pending work without
    /// calling `on_change`. Any other new query calls `on_change`, cancels the
    /// previous request and schedules a fetch after the debounce interval.
    pub fn set_query<F: FnOnce()>(&mut self, query: &str, on_change: F) {
        if query == self.query {
            return;
        }
        self.query = query.to_string();

        if query.chars().count() < MIN_QUERY_LEN {
            self.flight.cancel();
            self.state.results.clear();
            self.state.error = None;
            self.state.is_loading = false;
            return;
        }

        on_change();
        if self.flight.cancel() {
            debug!("superseded previous search");
        }
        self.state.is_loading = false;

        let api = Arc::clone(&self.api);
        let debounce = self.debounce;
        let query = query.to_string();
        self.flight.launch(move |emitter| async move {
            tokio::time::sleep(debounce).await;
            emitter.emit(SearchEvent::Dispatched);
            let outcome = api.search(&query).await;
            emitter.emit(SearchEvent::Resolved(outcome));
        });
    }

    /// Waits for the next event of the live search. Pending forever when idle.
    pub async fn next_event(&mut self) -> SearchEvent {
        self.flight.next().await
    }

    pub fn apply(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Dispatched => {
                debug!(query = %self.query, "search dispatched");
                self.state.is_loading = true;
                self.state.error = None;
            }
            SearchEvent::Resolved(Ok(results)) => {
                info!(query = %self.query, count = results.len(), "search completed");
                self.flight.settle();
                self.state.is_loading = false;
                self.state.error = None;
                self.state.results = results;
            }
            SearchEvent::Resolved(Err(err)) => {
                if !matches!(err, OmdbError::NotFound) {
                    warn!(query = %self.query, "Error fetching movies: {}", err);
                }
                self.flight.settle();
                self.state.is_loading = false;
                self.state.results.clear();
                self.state.error = Some(err.to_string());
            }
        }
    }

    /// Applies every event already delivered. Returns true if any was applied.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.flight.try_next() {
            self.apply(event);
            changed = true;
        }
        changed
    }

    /// Waits for and applies one event.
    pub async fn step(&mut self) {
        let event = self.next_event().await;
        self.apply(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieDetail;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingOmdb {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OmdbApi for CountingOmdb {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, OmdbError> {
            self.calls.lock().unwrap().push(query.to_string());
            Ok(vec![SearchResult {
                id: format!("id-{query}"),
                title: query.to_string(),
                year: "2000".to_string(),
                poster_url: None,
            }])
        }

        async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, OmdbError> {
            Err(OmdbError::Malformed(format!("unexpected detail call for {id}")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_clears_without_calling_back() {
        let api = Arc::new(CountingOmdb::default());
        let mut search = SearchController::new(api.clone(), Duration::from_millis(300));
        search.set_query("alien", || {});
        search.step().await;
        search.step().await;
        assert_eq!(search.results().len(), 1);

        let mut called = false;
        search.set_query("al", || called = true);
        assert!(!called);
        assert!(search.results().is_empty());
        assert!(search.error().is_none());
        assert!(!search.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn same_query_is_not_refetched() {
        let api = Arc::new(CountingOmdb::default());
        let mut search = SearchController::new(api.clone(), Duration::from_millis(300));
        search.set_query("heat", || {});
        search.step().await;
        search.step().await;

        let mut called = false;
        search.set_query("heat", || called = true);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!search.poll());
        assert!(!called);
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_spans_dispatch_to_resolution() {
        let api = Arc::new(CountingOmdb::default());
        let mut search = SearchController::new(api, Duration::from_millis(300));
        search.set_query("jaws", || {});
        assert!(!search.is_loading());
        search.step().await;
        assert!(search.is_loading());
        search.step().await;
        assert!(!search.is_loading());
        assert_eq!(search.results()[0].title, "jaws");
    }
}
