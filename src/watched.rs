use tracing::{info, warn};

use crate::models::{WatchedEntry, MAX_USER_RATING, MIN_USER_RATING};
use crate::store::{ListStore, StoreError};

pub const WATCHED_KEY: &str = "watched";

/// Averages shown above the watched list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_external_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

/// Arithmetic mean where unknown values count as zero. Empty input averages to 0.
pub fn average<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v.unwrap_or(0.0), n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// The user's rated movies, persisted after every change.
#[derive(Debug)]
pub struct WatchedList {
    store: ListStore,
    entries: Vec<WatchedEntry>,
}

impl WatchedList {
    pub fn load(store: ListStore) -> Result<Self, StoreError> {
        let mut entries: Vec<WatchedEntry> = store.load(WATCHED_KEY, Vec::new())?;
        entries.retain(|e| {
            let valid = (MIN_USER_RATING..=MAX_USER_RATING).contains(&e.user_rating);
            if !valid {
                warn!(
                    id = %e.id,
                    rating = e.user_rating,
                    "dropping stored entry with out-of-range rating"
                );
            }
            valid
        });
        let before = entries.len();
        let mut seen = std::collections::HashSet::new();
        entries.retain(|e| seen.insert(e.id.clone()));
        if entries.len() != before {
            warn!(
                dropped = before - entries.len(),
                "stored watched list had duplicate ids"
            );
        }
        info!(count = entries.len(), "watched list loaded");
        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn user_rating_for(&self, id: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.user_rating)
    }

    /// Appends `entry`. Returns false, without saving, when its id is already present.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<bool, StoreError> {
        if self.contains(&entry.id) {
            warn!(id = %entry.id, "movie already in watched list");
            return Ok(false);
        }
        info!(
            id = %entry.id,
            title = %entry.title,
            rating = entry.user_rating,
            "added to watched"
        );
        let mut next = self.entries.clone();
        next.push(entry);
        self.commit(next)?;
        Ok(true)
    }

    /// Removes the entry with `id`. Returns false when there was none.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next: Vec<WatchedEntry> = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        info!(id = %id, "removed from watched");
        Ok(true)
    }

    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary {
            count: self.entries.len(),
            avg_external_rating: average(
                self.entries.iter().map(|e| e.external_rating.map(f64::from)),
            ),
            avg_user_rating: average(self.entries.iter().map(|e| Some(f64::from(e.user_rating)))),
            avg_runtime: average(
                self.entries.iter().map(|e| e.runtime_minutes.map(f64::from)),
            ),
        }
    }

    /// Saves `next` and only then makes it the in-memory list, so memory and
    /// disk agree even when the write fails.
    fn commit(&mut self, next: Vec<WatchedEntry>) -> Result<(), StoreError> {
        self.store.save(WATCHED_KEY, &next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_with_two_decimals() {
        let avg = average([Some(7.0), Some(8.0), Some(9.0)]);
        assert_eq!(format!("{avg:.2}"), "8.00");
    }

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(average(std::iter::empty::<Option<f64>>()), 0.0);
    }

    #[test]
    fn unknown_values_count_as_zero() {
        assert_eq!(average([Some(6.0), None]), 3.0);
    }
}
