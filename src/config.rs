use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OMDB_BASE: &str = "http://www.omdbapi.com/";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub data_dir: PathBuf,
    pub debounce: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let omdb_api_key = get("OMDB_API_KEY")
            .ok_or_else(|| anyhow!("Missing required environment variable: OMDB_API_KEY"))?;
        let omdb_base_url = get("OMDB_BASE_URL").unwrap_or_else(|| DEFAULT_OMDB_BASE.to_string());
        let data_dir = match get("POPCORN_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let debounce_ms = match get("POPCORN_DEBOUNCE_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("POPCORN_DEBOUNCE_MS is not a number: {raw}"))?,
            None => DEFAULT_DEBOUNCE_MS,
        };

        Ok(Self {
            omdb_api_key,
            omdb_base_url,
            data_dir,
            debounce: Duration::from_millis(debounce_ms),
        })
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("com", "popcorn", "popcorn")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("No home directory found; set POPCORN_DATA_DIR"))
}
