//! Recently used search queries.
//!
//! The store owns no global state: callers construct it over whatever
//! [`HistoryStorage`] fits their host (a directory on disk, memory in
//! tests) and pass it to the code that records searches.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

pub const HISTORY_KEY: &str = "recentSearches";
pub const MAX_RECENT: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode search history: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// String key/value storage, in the manner of browser local storage.
pub trait HistoryStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl HistoryStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, HistoryError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(HistoryError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl HistoryStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

pub struct RecentSearches<S: HistoryStorage> {
    storage: S,
    entries: Vec<String>,
}

impl<S: HistoryStorage> RecentSearches<S> {
    /// Read the saved history. Missing or corrupt content starts empty.
    pub fn load(storage: S) -> Self {
        let mut entries = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable search history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read search history");
                Vec::new()
            }
        };
        entries.truncate(MAX_RECENT);
        Self { storage, entries }
    }

    /// Most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Move `query` to the front and persist. Blank queries are ignored.
    pub fn record(&mut self, query: &str) -> Result<&[String], HistoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(&self.entries);
        }

        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT);

        let raw = serde_json::to_string(&self.entries)?;
        self.storage.set(HISTORY_KEY, &raw)?;
        Ok(&self.entries)
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_moves_to_front_and_caps() {
        let mut recent = RecentSearches::load(MemoryStorage::default());
        for q in ["Dune", "Alien", "Heat", "Up", "Jaws", "Rocky"] {
            recent.record(q).unwrap();
        }
        assert_eq!(recent.entries(), ["Rocky", "Jaws", "Up", "Heat", "Alien"]);

        recent.record("  Heat ").unwrap();
        assert_eq!(recent.entries(), ["Heat", "Rocky", "Jaws", "Up", "Alien"]);
    }

    #[test]
    fn test_blank_is_ignored() {
        let mut recent = RecentSearches::load(MemoryStorage::default());
        recent.record("   ").unwrap();
        assert!(recent.entries().is_empty());
        let storage = recent.into_storage();
        assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_persists_through_storage() {
        let mut recent = RecentSearches::load(MemoryStorage::default());
        recent.record("Oppenheimer").unwrap();
        recent.record("Top Gun: Maverick").unwrap();

        let storage = recent.into_storage();
        assert_eq!(
            storage.get(HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["Top Gun: Maverick","Oppenheimer"]"#)
        );

        let reloaded = RecentSearches::load(storage);
        assert_eq!(reloaded.entries(), ["Top Gun: Maverick", "Oppenheimer"]);
    }

    #[test]
    fn test_corrupt_history_starts_empty() {
        let storage = MemoryStorage::default();
        storage.set(HISTORY_KEY, "{not json").unwrap();
        let recent = RecentSearches::load(storage);
        assert!(recent.entries().is_empty());
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("history"));
        assert_eq!(storage.get(HISTORY_KEY).unwrap(), None);

        let mut recent = RecentSearches::load(storage.clone());
        recent.record("Heat").unwrap();

        let reloaded = RecentSearches::load(storage);
        assert_eq!(reloaded.entries(), ["Heat"]);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let err = storage.set("../escape", "[]").unwrap_err();
        assert!(matches!(err, HistoryError::InvalidKey(_)));
    }
}
