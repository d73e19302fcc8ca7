use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage key the watchlist blob lives under
pub const DEFAULT_WATCHLIST_KEY: &str = "movieWatchlist";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub watchlist: WatchlistConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TmdbConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    /// Passed as the `language` query parameter when set (e.g. "en-US")
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_cast_limit")]
    pub cast_limit: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per key under the data directory
    File,
    /// Process-local; nothing survives the run
    Memory,
    /// No storage capability at all: reads are empty, writes are dropped
    Disabled,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchlistConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_watchlist_key")]
    pub key: String,
    /// Upper bound on a stored value in bytes; 0 disables the check
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
    /// Overrides the storage directory derived from the data dir
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl_minutes")]
    pub ttl_minutes: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Force JSON logs; when unset JSON is used only if stdout is not a terminal
    #[serde(default)]
    pub json: Option<bool>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_cast_limit() -> usize {
    5
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_watchlist_key() -> String {
    DEFAULT_WATCHLIST_KEY.to_string()
}

fn default_quota_bytes() -> u64 {
    5 * 1024 * 1024 // same ceiling browsers put on local storage
}

fn default_cache_ttl_minutes() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            image_base_url: default_image_base_url(),
            language: None,
            cast_limit: default_cast_limit(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            key: default_watchlist_key(),
            quota_bytes: default_quota_bytes(),
            storage_dir: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("tmdb.api_base_url", &self.tmdb.api_base_url),
            ("tmdb.image_base_url", &self.tmdb.image_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }

        if self.tmdb.cast_limit == 0 {
            return Err(anyhow::anyhow!("tmdb.cast_limit must be at least 1"));
        }

        if self.tmdb.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("tmdb.timeout_seconds must be at least 1"));
        }

        if self.watchlist.key.trim().is_empty() {
            return Err(anyhow::anyhow!("watchlist.key cannot be empty"));
        }

        Ok(())
    }

    /// Quota for the storage backend, `None` when unlimited
    pub fn storage_quota(&self) -> Option<u64> {
        Some(self.watchlist.quota_bytes).filter(|q| *q > 0)
    }

    /// Storage directory for the file backend, honoring the override
    pub fn storage_dir(&self, paths: &crate::PathManager) -> PathBuf {
        self.watchlist
            .storage_dir
            .clone()
            .unwrap_or_else(|| paths.storage_dir())
    }
}
