use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::{MovieDetail, SearchResult};

pub const NOT_FOUND_MESSAGE: &str = "Movie not found";

#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("Movie not found")]
    NotFound,
    #[error("Error: {status}: {reason}")]
    Transport { status: u16, reason: String },
    #[error("Error: request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Error: malformed OMDb response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait OmdbApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, OmdbError>;
    async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, OmdbError>;
}

#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let user_agent = format!("popcorn/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build OMDb HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(&config.omdb_base_url, &config.omdb_api_key)
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}?apikey={}&s={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(query)
        )
    }

    fn detail_url(&self, id: &str) -> String {
        format!(
            "{}?apikey={}&i={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(id)
        )
    }

    async fn get_text(&self, url: &str) -> Result<String, OmdbError> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(OmdbError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(res.text().await?)
    }
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, OmdbError> {
        debug!(query = %query, "OMDb search");
        let body = self.get_text(&self.search_url(query)).await?;
        decode_search(&body)
    }

    async fn fetch_detail(&self, id: &str) -> Result<MovieDetail, OmdbError> {
        debug!(id = %id, "OMDb detail");
        let body = self.get_text(&self.detail_url(id)).await?;
        decode_detail(&body)
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search")]
    search: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseFlag {
    #[serde(rename = "Response")]
    response: String,
}

#[derive(Debug, Deserialize)]
struct DetailBody {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Runtime")]
    runtime: String,
    #[serde(rename = "imdbRating")]
    imdb_rating: String,
    #[serde(rename = "Plot")]
    plot: String,
    #[serde(rename = "Released")]
    released: String,
    #[serde(rename = "Actors")]
    actors: String,
    #[serde(rename = "Director")]
    director: String,
    #[serde(rename = "Genre")]
    genre: String,
}

pub fn decode_search(body: &str) -> Result<Vec<SearchResult>, OmdbError> {
    let envelope: SearchEnvelope =
        serde_json::from_str(body).map_err(|e| OmdbError::Malformed(e.to_string()))?;
    if is_false(&envelope.response) {
        return Err(OmdbError::NotFound);
    }
    let items = envelope
        .search
        .ok_or_else(|| OmdbError::Malformed("missing Search list".to_string()))?;
    Ok(items
        .into_iter()
        .map(|item| SearchResult {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: poster_url(item.poster),
        })
        .collect())
}

pub fn decode_detail(body: &str) -> Result<MovieDetail, OmdbError> {
    let flag: ResponseFlag =
        serde_json::from_str(body).map_err(|e| OmdbError::Malformed(e.to_string()))?;
    if is_false(&flag.response) {
        return Err(OmdbError::NotFound);
    }
    let detail: DetailBody =
        serde_json::from_str(body).map_err(|e| OmdbError::Malformed(e.to_string()))?;
    Ok(MovieDetail {
        runtime_minutes: parse_runtime(&detail.runtime),
        external_rating: parse_rating(&detail.imdb_rating),
        id: detail.imdb_id,
        title: detail.title,
        year: detail.year,
        poster_url: poster_url(detail.poster),
        plot: detail.plot,
        release_date: detail.released,
        actors: detail.actors,
        director: detail.director,
        genre: detail.genre,
        runtime_label: detail.runtime,
    })
}

fn is_false(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("false")
}

fn poster_url(raw: Option<String>) -> Option<String> {
    raw.filter(|p| !p.is_empty() && p != "N/A")
}

/// Parses "148 min" into 148. Anything without a leading number is unknown.
pub fn parse_runtime(input: &str) -> Option<u32> {
    input.split_whitespace().next()?.parse().ok()
}

pub fn parse_rating(input: &str) -> Option<f32> {
    input
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|r| (0.0..=10.0).contains(r))
}
