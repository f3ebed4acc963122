use std::sync::Arc;
use tracing::{info, warn};

use crate::flight::Flight;
use crate::models::{MovieDetail, WatchedEntry, MAX_USER_RATING};
use crate::omdb::{OmdbApi, OmdbError};

pub const DEFAULT_TITLE: &str = "usePopcorn";

#[derive(Debug)]
pub struct DetailEvent(pub Result<MovieDetail, OmdbError>);

/// Fetches full metadata for the selected movie and holds the draft rating.
pub struct DetailFetcher {
    api: Arc<dyn OmdbApi>,
    selected: Option<String>,
    detail: Option<MovieDetail>,
    is_loading: bool,
    error: Option<String>,
    draft_rating: u8,
    flight: Flight<DetailEvent>,
}

impl DetailFetcher {
    pub fn new(api: Arc<dyn OmdbApi>) -> Self {
        Self {
            api,
            selected: None,
            detail: None,
            is_loading: false,
            error: None,
            draft_rating: 0,
            flight: Flight::new(),
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft_rating(&self) -> u8 {
        self.draft_rating
    }

    /// Opens `id`, or closes the pane when `id` is already selected.
    /// Returns whether the pane is open afterwards.
    pub fn select(&mut self, id: &str) -> bool {
        if self.selected.as_deref() == Some(id) {
            self.close();
            return false;
        }
        self.selected = Some(id.to_string());
        self.detail = None;
        self.error = None;
        self.draft_rating = 0;
        self.is_loading = true;

        let api = Arc::clone(&self.api);
        let id = id.to_string();
        self.flight.launch(move |emitter| async move {
            let outcome = api.fetch_detail(&id).await;
            emitter.emit(DetailEvent(outcome));
        });
        true
    }

    pub fn close(&mut self) {
        self.flight.cancel();
        self.selected = None;
        self.detail = None;
        self.error = None;
        self.is_loading = false;
        self.draft_rating = 0;
    }

    pub async fn next_event(&mut self) -> DetailEvent {
        self.flight.next().await
    }

    pub fn apply(&mut self, event: DetailEvent) {
        self.flight.settle();
        self.is_loading = false;
        match event.0 {
            Ok(detail) => {
                info!(id = %detail.id, title = %detail.title, "detail loaded");
                self.detail = Some(detail);
            }
            Err(err) => {
                warn!(id = ?self.selected, "Error fetching movie details: {}", err);
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.flight.try_next() {
            self.apply(event);
            changed = true;
        }
        changed
    }

    pub async fn step(&mut self) {
        let event = self.next_event().await;
        self.apply(event);
    }

    pub fn set_draft_rating(&mut self, rating: u8) {
        self.draft_rating = rating.min(MAX_USER_RATING);
    }

    pub fn adjust_draft_rating(&mut self, delta: i8) {
        let next = (self.draft_rating as i16 + delta as i16).clamp(0, MAX_USER_RATING as i16);
        self.draft_rating = next as u8;
    }

    /// The entry the add action would create, if a detail is loaded and rated.
    pub fn pending_entry(&self) -> Option<WatchedEntry> {
        let detail = self.detail.as_ref()?;
        WatchedEntry::from_detail(detail, self.draft_rating)
    }

    pub fn window_title(&self) -> String {
        match &self.detail {
            Some(detail) if !detail.title.is_empty() => format!("Movie | {}", detail.title),
            _ => DEFAULT_TITLE.to_string(),
        }
    }
}
