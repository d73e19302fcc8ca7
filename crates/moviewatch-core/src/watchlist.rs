//! The user's watchlist, persisted as one JSON array under a single storage key.
//!
//! Every mutation is a whole-collection read-modify-write. Nothing here returns
//! an error: storage and decoding failures are handed to the failure hook and
//! replaced with a safe default (empty read, dropped write). An entry that
//! cannot be decoded is reported and skipped; the rest of the list is kept. A dropped write
//! still returns the updated list, so a caller that needs to know the change
//! stuck has to read it back or use [`WatchlistStore::load`].
//!
//! Two processes mutating the same storage at once can lose updates; the last
//! writer's copy wins. This is a known limitation, not guarded against.

use moviewatch_config::DEFAULT_WATCHLIST_KEY;
use moviewatch_models::{MovieId, MovieSummary, WatchlistEntry};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use crate::storage::{KeyValueStorage, StorageError};

#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error("failed to read watchlist: {0}")]
    Read(#[source] StorageError),

    #[error("stored watchlist is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("skipped unreadable watchlist entry at position {index}: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode watchlist: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to save watchlist: {0}")]
    Write(#[source] StorageError),
}

/// Receives every failure the store masks
pub type FailureHook = Arc<dyn Fn(&StoreFailure) + Send + Sync>;

/// Result of reading the stored watchlist, distinguishing "nothing stored" from "unreadable"
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Vec<WatchlistEntry>),
    /// No storage capability, or nothing stored under the key yet
    Empty,
    /// Already reported to the failure hook
    Failed(StoreFailure),
}

impl LoadOutcome {
    /// Entries, with failures collapsed to an empty list
    pub fn into_entries(self) -> Vec<WatchlistEntry> {
        match self {
            LoadOutcome::Loaded(entries) => entries,
            LoadOutcome::Empty | LoadOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

fn log_failure(failure: &StoreFailure) {
    match failure {
        StoreFailure::Read(_) | StoreFailure::Malformed(_) => {
            warn!(error = %failure, "Watchlist unreadable, treating as empty");
        }
        StoreFailure::InvalidEntry { .. } => {
            warn!(error = %failure, "Dropping unreadable watchlist entry");
        }
        StoreFailure::Encode(_) | StoreFailure::Write(_) => {
            error!(error = %failure, "Watchlist change was not saved");
        }
    }
}

pub struct WatchlistStore {
    storage: Option<Arc<dyn KeyValueStorage>>,
    key: String,
    on_failure: FailureHook,
}

impl WatchlistStore {
    pub fn new<S: KeyValueStorage + 'static>(storage: S) -> Self {
        Self::from_shared(Some(Arc::new(storage)))
    }

    /// Store over an optional, possibly shared, capability
    pub fn from_shared(storage: Option<Arc<dyn KeyValueStorage>>) -> Self {
        Self {
            storage,
            key: DEFAULT_WATCHLIST_KEY.to_string(),
            on_failure: Arc::new(log_failure),
        }
    }

    /// Store with no storage capability: reads are empty and writes are discarded
    pub fn detached() -> Self {
        Self::from_shared(None)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Replace the default logging hook
    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.on_failure = hook;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_attached(&self) -> bool {
        self.storage.is_some()
    }

    pub fn storage_name(&self) -> Option<&str> {
        self.storage.as_ref().map(|s| s.name())
    }

    /// Read the stored watchlist
    pub fn load(&self) -> LoadOutcome {
        let Some(storage) = &self.storage else {
            debug!("No storage capability, watchlist is empty");
            return LoadOutcome::Empty;
        };

        let raw = match storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Empty,
            Err(e) => return self.fail(StoreFailure::Read(e)),
        };

        // A stored `null` reads as an empty list
        let values = match serde_json::from_str::<Option<Vec<Value>>>(&raw) {
            Ok(Some(values)) => values,
            Ok(None) => return LoadOutcome::Empty,
            Err(e) => return self.fail(StoreFailure::Malformed(e)),
        };

        // One bad entry must not cost the rest of the list
        let mut entries = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<WatchlistEntry>(value) {
                Ok(entry) => entries.push(entry),
                Err(source) => {
                    (self.on_failure)(&StoreFailure::InvalidEntry { index, source });
                }
            }
        }
        LoadOutcome::Loaded(entries)
    }

    pub fn list(&self) -> Vec<WatchlistEntry> {
        self.load().into_entries()
    }

    /// Append `movie` unwatched unless its id is already present.
    ///
    /// Adding a present id writes nothing and returns the list as stored.
    pub fn add(&self, movie: MovieSummary) -> Vec<WatchlistEntry> {
        let mut entries = self.list();
        if entries.iter().any(|e| e.id() == movie.id) {
            debug!(movie_id = movie.id, "Already on watchlist");
            return entries;
        }

        info!(movie_id = movie.id, title = %movie.title, "Adding to watchlist");
        entries.push(WatchlistEntry::from_summary(movie));
        self.save(&entries);
        entries
    }

    /// Drop the entry with `movie_id`. Always writes, even when nothing matched.
    pub fn remove(&self, movie_id: MovieId) -> Vec<WatchlistEntry> {
        let mut entries = self.list();
        let before = entries.len();
        entries.retain(|e| e.id() != movie_id);
        if entries.len() < before {
            info!(movie_id, "Removed from watchlist");
        }
        self.save(&entries);
        entries
    }

    /// Flip `watched` on the entry with `movie_id`. Always writes, even when absent.
    pub fn toggle_watched(&self, movie_id: MovieId) -> Vec<WatchlistEntry> {
        let mut entries = self.list();
        for entry in entries.iter_mut().filter(|e| e.id() == movie_id) {
            entry.watched = !entry.watched;
            info!(movie_id, watched = entry.watched, "Toggled watched status");
        }
        self.save(&entries);
        entries
    }

    pub fn is_member(&self, movie_id: MovieId) -> bool {
        self.list().iter().any(|e| e.id() == movie_id)
    }

    pub fn is_watched(&self, movie_id: MovieId) -> bool {
        self.list()
            .iter()
            .find(|e| e.id() == movie_id)
            .map(|e| e.watched)
            .unwrap_or(false)
    }

    /// Replace the stored watchlist with an empty one. Returns whether the write landed.
    pub fn clear(&self) -> bool {
        self.save(&[])
    }

    fn save(&self, entries: &[WatchlistEntry]) -> bool {
        let Some(storage) = &self.storage else {
            debug!("No storage capability, discarding watchlist write");
            return false;
        };

        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                self.fail(StoreFailure::Encode(e));
                return false;
            }
        };

        match storage.set(&self.key, &raw) {
            Ok(()) => {
                debug!(entries = entries.len(), key = %self.key, "Watchlist saved");
                true
            }
            Err(e) => {
                self.fail(StoreFailure::Write(e));
                false
            }
        }
    }

    fn fail(&self, failure: StoreFailure) -> LoadOutcome {
        (self.on_failure)(&failure);
        LoadOutcome::Failed(failure)
    }
}

#[cfg(test)]
mod tests;
