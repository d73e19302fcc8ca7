use anyhow::{Context, Result};
use moviewatch_catalog::MovieCatalog;
use moviewatch_models::{CastMember, Credits, MovieCategory, MovieDetails, MovieId, MoviePage};
use serde::Serialize;
use tracing::{debug, info, warn};
use crate::cache::CatalogCache;

/// First page of every category, as shown on the landing page
#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub popular: MoviePage,
    pub now_playing: MoviePage,
    pub top_rated: MoviePage,
    pub upcoming: MoviePage,
}

impl HomeFeed {
    /// Sections in display order
    pub fn sections(&self) -> [(MovieCategory, &MoviePage); 4] {
        [
            (MovieCategory::Popular, &self.popular),
            (MovieCategory::NowPlaying, &self.now_playing),
            (MovieCategory::TopRated, &self.top_rated),
            (MovieCategory::Upcoming, &self.upcoming),
        ]
    }
}

/// Everything the details view needs
#[derive(Debug, Clone, Serialize)]
pub struct MovieView {
    pub details: MovieDetails,
    pub cast: Vec<CastMember>,
}

pub struct Discovery<C: MovieCatalog> {
    catalog: C,
    cache: Option<CatalogCache>,
    cast_limit: usize,
}

impl<C: MovieCatalog> Discovery<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            cache: None,
            cast_limit: 5,
        }
    }

    pub fn with_cache(mut self, cache: CatalogCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cast_limit(mut self, cast_limit: usize) -> Self {
        self.cast_limit = cast_limit;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// All four categories at once. Any failing category fails the feed.
    pub async fn home(&self) -> Result<HomeFeed> {
        let (popular, now_playing, top_rated, upcoming) = futures::try_join!(
            self.category(MovieCategory::Popular, 1, false),
            self.category(MovieCategory::NowPlaying, 1, false),
            self.category(MovieCategory::TopRated, 1, false),
            self.category(MovieCategory::Upcoming, 1, false),
        )?;

        Ok(HomeFeed {
            popular,
            now_playing,
            top_rated,
            upcoming,
        })
    }

    /// One listing page. `refresh` skips the cache read but still updates it.
    pub async fn category(&self, category: MovieCategory, page: u32, refresh: bool) -> Result<MoviePage> {
        let page = page.max(1);

        if !refresh {
            if let Some(cached) = self.cache.as_ref().and_then(|c| c.load_page(category, page)) {
                return Ok(cached);
            }
        }

        let fetched = self
            .catalog
            .list_movies(category, page)
            .await
            .with_context(|| format!("Failed to fetch {} from {}", category, self.catalog.source_name()))?;
        debug!(category = category.slug(), page, count = fetched.results.len(), "Fetched listing");

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save_page(category, page, &fetched) {
                warn!("Failed to cache {} page {}: {}", category.slug(), page, e);
            }
        }

        Ok(fetched)
    }

    /// Details plus leading cast. `None` when the catalog has no such movie.
    pub async fn movie(&self, id: MovieId) -> Result<Option<MovieView>> {
        let (details, credits) = futures::join!(self.catalog.movie_details(id), self.catalog.movie_credits(id));

        let details = match details {
            Ok(details) => details,
            Err(e) if e.is_not_found() => {
                info!(movie_id = id, "Movie not found in {}", self.catalog.source_name());
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to fetch movie {}", id)),
        };

        let credits = credits.unwrap_or_else(|e| {
            warn!(movie_id = id, error = %e, "Failed to fetch credits, showing no cast");
            Credits::empty()
        });

        Ok(Some(MovieView {
            cast: credits.top_cast(self.cast_limit),
            details,
        }))
    }

    /// Title search. A blank query returns an empty page without a request.
    pub async fn search(&self, query: &str, page: u32) -> Result<MoviePage> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Blank search query, skipping request");
            return Ok(MoviePage::empty());
        }

        self.catalog
            .search_movies(query, page.max(1))
            .await
            .with_context(|| format!("Search for '{}' failed", query))
    }
}
