use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use moviewatch_config::PathManager;
use moviewatch_models::{MovieCategory, MoviePage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CachedPage {
    fetched_at: DateTime<Utc>,
    page: MoviePage,
}

/// On-disk cache of category listing pages with a freshness window
#[derive(Clone)]
pub struct CatalogCache {
    dir: PathBuf,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(dir: impl Into<PathBuf>, ttl_minutes: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::minutes(ttl_minutes.min(i64::MAX as u64) as i64),
        }
    }

    pub fn from_paths(path_manager: &PathManager, ttl_minutes: u64) -> Self {
        Self::new(path_manager.catalog_cache_dir(), ttl_minutes)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn page_path(&self, category: MovieCategory, page: u32) -> PathBuf {
        self.dir.join(format!("{}_page{}.json", category.slug(), page.max(1)))
    }

    /// Fresh cached page, or `None` on a miss. Corrupt entries are deleted.
    pub fn load_page(&self, category: MovieCategory, page: u32) -> Option<MoviePage> {
        let path = self.page_path(category, page);
        if !path.exists() {
            debug!("Cache miss: {} page {} (file does not exist)", category.slug(), page);
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache file for {} page {}: {}", category.slug(), page, e);
                return None;
            }
        };

        let cached = match serde_json::from_str::<CachedPage>(&content) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(
                    "Cache corruption detected for {} page {}: {}. Deleting corrupted file.",
                    category.slug(),
                    page,
                    e
                );
                if let Err(rm_err) = std::fs::remove_file(&path) {
                    warn!("Failed to delete corrupted cache file: {}", rm_err);
                }
                return None;
            }
        };

        let age = Utc::now() - cached.fetched_at;
        if age > self.ttl {
            debug!(
                "Cache stale: {} page {} (fetched {} minutes ago)",
                category.slug(),
                page,
                age.num_minutes()
            );
            return None;
        }

        info!("Cache hit: {} page {} ({} movies)", category.slug(), page, cached.page.results.len());
        Some(cached.page)
    }

    pub fn save_page(&self, category: MovieCategory, page: u32, data: &MoviePage) -> Result<()> {
        self.save_page_at(category, page, data, Utc::now())
    }

    fn save_page_at(
        &self,
        category: MovieCategory,
        page: u32,
        data: &MoviePage,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.page_path(category, page);

        let cached = CachedPage {
            fetched_at,
            page: data.clone(),
        };
        let json = serde_json::to_string_pretty(&cached)
            .map_err(|e| anyhow!("Failed to serialize cache: {}", e))?;
        std::fs::write(&path, json).map_err(|e| anyhow!("Failed to write cache: {}", e))?;

        debug!("Cache saved: {} page {} ({} movies)", category.slug(), page, data.results.len());
        Ok(())
    }

    /// Remove every cached page. Returns how many files were deleted.
    pub fn clear(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        info!("Cleared {} cached catalog pages", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviewatch_models::MovieSummary;
    use tempfile::TempDir;

    fn sample_page() -> MoviePage {
        MoviePage {
            page: 1,
            results: vec![MovieSummary::new(550, "Fight Club")],
            total_pages: 3,
            total_results: 60,
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = CatalogCache::new(dir.path().join("catalog"), 60);
        assert!(cache.load_page(MovieCategory::Popular, 1).is_none());

        cache.save_page(MovieCategory::Popular, 1, &sample_page()).unwrap();
        assert_eq!(cache.load_page(MovieCategory::Popular, 1), Some(sample_page()));
        assert!(cache.load_page(MovieCategory::Popular, 2).is_none());
        assert!(cache.load_page(MovieCategory::TopRated, 1).is_none());
        assert!(dir.path().join("catalog/popular_page1.json").exists());
    }

    #[test]
    fn test_stale_page_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = CatalogCache::new(dir.path(), 30);
        let an_hour_ago = Utc::now() - Duration::minutes(60);
        cache
            .save_page_at(MovieCategory::Upcoming, 1, &sample_page(), an_hour_ago)
            .unwrap();
        assert!(cache.load_page(MovieCategory::Upcoming, 1).is_none());
        // Stale entries are left for the next save to overwrite
        assert!(dir.path().join("upcoming_page1.json").exists());
    }

    #[test]
    fn test_corrupt_page_is_deleted() {
        let dir = TempDir::new().unwrap();
        let cache = CatalogCache::new(dir.path(), 60);
        let path = dir.path().join("now_playing_page1.json");
        std::fs::write(&path, "{ truncated").unwrap();

        assert!(cache.load_page(MovieCategory::NowPlaying, 1).is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let cache = CatalogCache::new(dir.path(), 60);
        assert_eq!(CatalogCache::new(dir.path().join("missing"), 60).clear().unwrap(), 0);

        cache.save_page(MovieCategory::Popular, 1, &sample_page()).unwrap();
        cache.save_page(MovieCategory::Popular, 2, &sample_page()).unwrap();
        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.load_page(MovieCategory::Popular, 1).is_none());
    }
}
