use async_trait::async_trait;
use moviewatch_config::TmdbConfig;
use moviewatch_models::{Credits, MovieCategory, MovieDetails, MovieId, MoviePage};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use crate::error::CatalogError;
use crate::images::ImageUrls;
use crate::tmdb::api::{self, ApiContext};
use crate::traits::MovieCatalog;

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    language: Option<String>,
    images: ImageUrls,
}

impl TmdbClient {
    /// Build a client from config. A missing key is only reported when a request is made.
    pub fn new(config: &TmdbConfig, api_key: Option<String>) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(concat!("moviewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base_url.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            language: config.language.clone(),
            images: ImageUrls::new(config.image_base_url.clone()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn images(&self) -> &ImageUrls {
        &self.images
    }

    fn context(&self) -> Result<ApiContext<'_>, CatalogError> {
        let api_key = self.api_key.as_deref().ok_or(CatalogError::MissingApiKey)?;
        Ok(ApiContext {
            base_url: &self.base_url,
            api_key,
            language: self.language.as_deref(),
        })
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    fn source_name(&self) -> &str {
        "tmdb"
    }

    async fn list_movies(&self, category: MovieCategory, page: u32) -> Result<MoviePage, CatalogError> {
        let ctx = self.context()?;
        api::get_movie_list(&self.client, &ctx, category, page).await
    }

    async fn movie_details(&self, id: MovieId) -> Result<MovieDetails, CatalogError> {
        let ctx = self.context()?;
        api::get_movie_details(&self.client, &ctx, id).await
    }

    async fn movie_credits(&self, id: MovieId) -> Result<Credits, CatalogError> {
        let ctx = self.context()?;
        api::get_movie_credits(&self.client, &ctx, id).await
    }

    async fn search_movies(&self, query: &str, page: u32) -> Result<MoviePage, CatalogError> {
        let ctx = self.context()?;
        api::search_movies(&self.client, &ctx, query, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        let client = TmdbClient::new(&TmdbConfig::default(), Some("   ".to_string())).unwrap();
        assert!(!client.has_api_key());
        assert!(matches!(client.context(), Err(CatalogError::MissingApiKey)));

        let client = TmdbClient::new(&TmdbConfig::default(), Some("abc".to_string())).unwrap();
        assert!(client.has_api_key());
        assert_eq!(client.context().unwrap().api_key, "abc");
        assert_eq!(client.source_name(), "tmdb");
    }

    #[test]
    fn test_images_use_configured_base() {
        let mut config = TmdbConfig::default();
        config.image_base_url = "https://cdn.example/t/p".to_string();
        let client = TmdbClient::new(&config, None).unwrap();
        assert_eq!(client.images().poster(Some("/x.jpg")), "https://cdn.example/t/p/w500/x.jpg");
    }
}
