//! String-keyed JSON slots on disk, one file per key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid slot key '{0}'")]
    InvalidKey(String),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("stored data in {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode slot '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ListStore {
    dir: PathBuf,
}

impl ListStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;
        debug!(dir = %dir.display(), "list store opened");
        Ok(Self { dir })
    }

    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Reads slot `key`, or returns `initial` when the slot has never been written.
    /// A slot that exists but does not decode is an error.
    pub fn load<T: DeserializeOwned>(&self, key: &str, initial: T) -> Result<T, StoreError> {
        let path = self.slot_path(key)?;
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(key, "no stored value, using initial");
                return Ok(initial);
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        serde_json::from_str(&body).map_err(|source| StoreError::Corrupt { path, source })
    }

    /// Writes slot `key`, replacing any previous value in one rename.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        let body = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, body).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(key, path = %path.display(), "slot saved");
        Ok(())
    }
}
