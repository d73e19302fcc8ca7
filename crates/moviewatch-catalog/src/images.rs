/// Shown when a movie has no poster
pub const PLACEHOLDER_POSTER: &str = "/no-image-available.png";

const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "w1280";
const PROFILE_SIZE: &str = "w185";

/// Builds image CDN URLs from the relative paths the API returns
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base_url: String,
}

impl ImageUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Poster URL, or the placeholder when the movie has none
    pub fn poster(&self, path: Option<&str>) -> String {
        self.sized(POSTER_SIZE, path)
            .unwrap_or_else(|| PLACEHOLDER_POSTER.to_string())
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.sized(BACKDROP_SIZE, path)
    }

    pub fn profile(&self, path: Option<&str>) -> Option<String> {
        self.sized(PROFILE_SIZE, path)
    }

    fn sized(&self, size: &str, path: Option<&str>) -> Option<String> {
        let path = path.map(str::trim).filter(|p| !p.is_empty())?;
        if path.starts_with('/') {
            Some(format!("{}/{}{}", self.base_url, size, path))
        } else {
            Some(format!("{}/{}/{}", self.base_url, size, path))
        }
    }
}
