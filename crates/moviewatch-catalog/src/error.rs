use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("TMDB API key is not set. Set TMDB_API_KEY or run 'moviewatch config tmdb'")]
    MissingApiKey,

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} for {context}: {message}")]
    Status {
        status: u16,
        context: String,
        message: String,
    },

    #[error("The resource you requested could not be found: {0}")]
    NotFound(String),

    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
