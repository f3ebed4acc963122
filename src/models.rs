use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub external_rating: Option<f32>,
    pub plot: String,
    pub release_date: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
    /// Runtime as the API reported it, e.g. "148 min".
    pub runtime_label: String,
}

/// A rated movie in the user's watched list. Field names on disk follow the
/// `watched` slot format written by earlier releases.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: String,
    pub title: String,
    pub year: String,
    #[serde(rename = "poster", default)]
    pub poster_url: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub external_rating: Option<f32>,
    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,
    #[serde(rename = "userRating")]
    pub user_rating: u8,
}

pub const MIN_USER_RATING: u8 = 1;
pub const MAX_USER_RATING: u8 = 10;

impl WatchedEntry {
    /// Builds an entry from a loaded detail and a confirmed rating.
    /// Returns `None` when the rating is outside 1..=10.
    pub fn from_detail(detail: &MovieDetail, user_rating: u8) -> Option<Self> {
        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&user_rating) {
            return None;
        }
        Some(Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            external_rating: detail.external_rating,
            runtime_minutes: detail.runtime_minutes,
            user_rating,
        })
    }
}
