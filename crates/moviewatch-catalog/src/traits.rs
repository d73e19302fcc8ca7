use async_trait::async_trait;
use moviewatch_models::{Credits, MovieCategory, MovieDetails, MovieId, MoviePage};
use crate::error::CatalogError;

/// Read-only movie catalog
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    fn source_name(&self) -> &str;

    async fn list_movies(&self, category: MovieCategory, page: u32) -> Result<MoviePage, CatalogError>;

    /// Fails with `CatalogError::NotFound` for unknown ids
    async fn movie_details(&self, id: MovieId) -> Result<MovieDetails, CatalogError>;

    async fn movie_credits(&self, id: MovieId) -> Result<Credits, CatalogError>;

    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError>;
}
