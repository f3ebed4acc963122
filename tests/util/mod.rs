#![allow(dead_code)]

use async_trait::async_trait;
use popcorn::models::{MovieDetail, SearchResult};
use popcorn::omdb::{OmdbApi, OmdbError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Scripted OMDb stand-in. Queries named `nothing` are not found, `boom`
/// fails with a 500, anything else returns one result titled after the query.
#[derive(Default)]
pub struct FakeOmdb {
    delays: HashMap<String, Duration>,
    dispatched: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl FakeOmdb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    async fn pause(&self, key: &str) {
        let delay = self
            .delays
            .get(key)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;
    }
}

pub fn movie_detail(id: &str) -> MovieDetail {
    MovieDetail {
        id: id.to_string(),
        title: format!("Detail {id}"),
        year: "1999".to_string(),
        poster_url: None,
        runtime_minutes: Some(136),
        external_rating: Some(8.5),
        plot: "A hacker learns the truth.".to_string(),
        release_date: "31 Mar 1999".to_string(),
        actors: "Keanu Reeves".to_string(),
        director: "Lana Wachowski".to_string(),
        genre: "Action, Sci-Fi".to_string(),
        runtime_label: "136 min".to_string(),
    }
}

#[async_trait]
impl OmdbApi for FakeOmdb {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, OmdbError> {
        self.dispatched.lock().unwrap().push(query.to_string());
        self.pause(query).await;
        self.completed.lock().unwrap().push(query.to_string());
        match query {
            "nothing" => Err(OmdbError::NotFound),
            "boom" => Err(OmdbError::Transport {
                status: 500,
                reason: "Internal Server Error".to_string(),
            }),
            _ => Ok(vec![SearchResult {
                id: format!("tt-{query}"),
                title: query.to_string(),
                year: "1999".to_string(),
                poster_url: None,
            }]),
        }
    }

    async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, OmdbError> {
        self.dispatched.lock().unwrap().push(id.to_string());
        self.pause(id).await;
        self.completed.lock().unwrap().push(id.to_string());
        Ok(movie_detail(id))
    }
}
