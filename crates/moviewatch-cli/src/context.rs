use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviewatch_catalog::TmdbClient;
use moviewatch_config::{resolve_tmdb_api_key, Config, CredentialStore, PathManager};
use moviewatch_core::{open_storage, CatalogCache, Discovery, FailureHook, WatchlistStore};

/// Paths and configuration shared by every command
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
}

impl AppContext {
    pub fn new(paths: PathManager, config: Config) -> Self {
        Self { paths, config }
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        let mut store = CredentialStore::new(self.paths.credentials_file());
        store
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", self.paths.credentials_file().display(), e))?;
        Ok(store)
    }

    pub fn catalog_cache(&self) -> CatalogCache {
        CatalogCache::from_paths(&self.paths, self.config.cache.ttl_minutes)
    }

    /// TMDB-backed discovery. Fails up front when no API key is configured.
    pub fn discovery(&self) -> Result<Discovery<TmdbClient>> {
        self.config
            .validate()
            .map_err(|e| eyre!("Invalid configuration: {}", e))?;

        let api_key = resolve_tmdb_api_key(&self.credentials()?).ok_or_else(|| {
            eyre!("No TMDB API key configured. Run 'moviewatch config tmdb' or set TMDB_API_KEY.")
        })?;

        let client = TmdbClient::new(&self.config.tmdb, Some(api_key))
            .map_err(|e| eyre!("Failed to create TMDB client: {}", e))?;

        let mut discovery = Discovery::new(client).with_cast_limit(self.config.tmdb.cast_limit);
        if self.config.cache.enabled {
            discovery = discovery.with_cache(self.catalog_cache());
        }
        Ok(discovery)
    }

    pub fn watchlist(&self) -> WatchlistStore {
        WatchlistStore::from_shared(open_storage(&self.config, &self.paths)).with_key(self.config.watchlist.key.clone())
    }

    pub fn watchlist_with_hook(&self, hook: FailureHook) -> WatchlistStore {
        self.watchlist().with_failure_hook(hook)
    }
}
