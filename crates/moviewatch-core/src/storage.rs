use moviewatch_config::{Config, PathManager, StorageBackend};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("value for '{key}' is {size} bytes, over the {quota} byte quota")]
    QuotaExceeded { key: String, size: u64, quota: u64 },
}

/// Synchronous string key-value capability the watchlist persists through.
///
/// `set` replaces the whole value or leaves the old one in place; callers rely
/// on never observing a half-written value.
pub trait KeyValueStorage: Send + Sync {
    fn name(&self) -> &str;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

fn check_quota(key: &str, value: &str, quota: Option<u64>) -> Result<(), StorageError> {
    let size = value.len() as u64;
    match quota {
        Some(quota) if size > quota => Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size,
            quota,
        }),
        _ => Ok(()),
    }
}

/// In-process storage. Used for the `memory` backend and as a test double.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    quota: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    /// Seed a raw value, bypassing the quota
    pub fn with_value(self, key: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        self
    }
}

impl KeyValueStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under a directory.
///
/// Writes go to a uniquely named temp file that is renamed over the target,
/// so a failed write leaves the previous value intact and readers only ever
/// see a complete value.
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys are mapped to file names; anything outside `[A-Za-z0-9_.-]` becomes `_`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStorage for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored value for '{}' at {:?}", key, path);
                Ok(None)
            }
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            StorageError::Unavailable(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.path_for(key);
        let write_err = |source: io::Error| StorageError::Write {
            key: key.to_string(),
            source,
        };

        // Each write gets its own temp file so concurrent writers never share one.
        // The temp file is removed on drop if anything below fails.
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        temp.write_all(value.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!("Stored {} bytes for '{}' at {:?}", value.len(), key, path);
        Ok(())
    }
}

/// Storage capability for the configured backend; `None` for `disabled`
pub fn open_storage(config: &Config, paths: &PathManager) -> Option<Arc<dyn KeyValueStorage>> {
    let quota = config.storage_quota();
    match config.watchlist.backend {
        StorageBackend::File => Some(Arc::new(FileStorage::new(config.storage_dir(paths)).with_quota(quota))),
        StorageBackend::Memory => Some(Arc::new(MemoryStorage::new().with_quota(quota))),
        StorageBackend::Disabled => None,
    }
}
