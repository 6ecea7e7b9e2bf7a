//! Small persistent key/value store for UI preferences and search history
//!
//! The whole map lives in one JSON file and is rewritten on every change.
//! It only ever holds a handful of short strings.

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const HISTORY_KEY: &str = "search_history";

pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    /// Open the store at `path`; a missing or unreadable file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt local store");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.into());
        self.persist(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock();
        let removed = entries.remove(key);
        if removed.is_some() {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.clear();
        self.persist(&entries)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// Recently submitted queries, newest first
pub struct SearchHistory<'a> {
    store: &'a LocalStore,
    limit: usize,
}

impl<'a> SearchHistory<'a> {
    pub fn new(store: &'a LocalStore, limit: usize) -> Self {
        Self { store, limit }
    }

    pub fn entries(&self) -> Vec<String> {
        self.store
            .get(HISTORY_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Remember `query`; blank queries are ignored and repeats move to the front
    pub fn record(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() || self.limit == 0 {
            return Ok(());
        }

        let mut entries = self.entries();
        entries.retain(|q| q != query);
        entries.insert(0, query.to_string());
        entries.truncate(self.limit);

        self.store.set(HISTORY_KEY, serde_json::to_string(&entries)?)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY).map(|_| ())
    }
}
