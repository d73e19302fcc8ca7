pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{CacheConfig, Config, LoggingConfig, StorageBackend, TmdbConfig, WatchlistConfig, DEFAULT_WATCHLIST_KEY};
pub use credentials::{resolve_tmdb_api_key, CredentialStore, TMDB_API_KEY_ENV};
pub use paths::{PathManager, base_path_override};
