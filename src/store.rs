//! Persistence for the one value that outlives a round: the high score.
//!
//! Storage is a flat string-to-string map. [`JsonFileStore`] keeps it in a
//! JSON object on disk; [`MemoryStore`] keeps it in memory for tests and for
//! runs started without a writable store.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::HIGH_SCORE_KEY;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {path:?} is not a JSON object: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// A JSON object file, read once on open and rewritten whole on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|source| StoreError::Format { path: path.clone(), source })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(JsonFileStore { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(|source| StoreError::Format { path: self.path.clone(), source })?;
        fs::write(&self.path, raw).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// The best score seen so far, backed by a [`KeyValueStore`].
pub struct HighScore {
    best: u32,
    store: Box<dyn KeyValueStore>,
}

impl HighScore {
    /// Reads the stored value; absent or garbage reads as 0.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let best = store
            .get(HIGH_SCORE_KEY)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        HighScore { best, store }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Records a finished round's score. Returns true when it beat the old
    /// best. The new best is kept in memory even if saving it fails.
    pub fn submit(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }

        self.best = score;
        if let Err(e) = self.store.set(HIGH_SCORE_KEY, score.to_string()) {
            log::error!("Error saving high score: {}", e);
        }
        true
    }
}
