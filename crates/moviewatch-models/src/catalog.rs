use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::movie::{MovieId, MovieSummary};

/// The four listings shown on the discovery page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovieCategory {
    Popular,
    NowPlaying,
    TopRated,
    Upcoming,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 4] = [
        MovieCategory::Popular,
        MovieCategory::NowPlaying,
        MovieCategory::TopRated,
        MovieCategory::Upcoming,
    ];

    /// Endpoint path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "movie/popular",
            MovieCategory::NowPlaying => "movie/now_playing",
            MovieCategory::TopRated => "movie/top_rated",
            MovieCategory::Upcoming => "movie/upcoming",
        }
    }

    /// Stable identifier used for cache file names and CLI values
    pub fn slug(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "popular",
            MovieCategory::NowPlaying => "now_playing",
            MovieCategory::TopRated => "top_rated",
            MovieCategory::Upcoming => "upcoming",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MovieCategory::Popular => "Popular Movies",
            MovieCategory::NowPlaying => "Now Playing",
            MovieCategory::TopRated => "Top Rated",
            MovieCategory::Upcoming => "Upcoming Movies",
        }
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for MovieCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "popular" => Ok(MovieCategory::Popular),
            "now_playing" => Ok(MovieCategory::NowPlaying),
            "top_rated" => Ok(MovieCategory::TopRated),
            "upcoming" => Ok(MovieCategory::Upcoming),
            _ => Err(format!(
                "Invalid category: {}. Use 'popular', 'now-playing', 'top-rated', or 'upcoming'",
                s
            )),
        }
    }
}

/// One page of a listing or search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl MoviePage {
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub origin_country: Option<String>,
}

/// Full record for a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
}

impl MovieDetails {
    /// Snapshot suitable for the watchlist
    pub fn summary(&self) -> MovieSummary {
        let mut summary = MovieSummary::new(self.id, self.title.clone());
        summary.poster_path = self.poster_path.clone();
        summary.vote_average = self.vote_average;
        summary.release_date = self.release_date.clone();
        if let Some(overview) = self.overview.as_ref().filter(|o| !o.is_empty()) {
            summary.extra.insert("overview".to_string(), serde_json::Value::String(overview.clone()));
        }
        if let Some(backdrop) = &self.backdrop_path {
            summary.extra.insert("backdrop_path".to_string(), serde_json::Value::String(backdrop.clone()));
        }
        summary
    }

    pub fn release_year(&self) -> Option<i32> {
        crate::movie::release_year(self.release_date.as_deref())
    }

    pub fn rating_label(&self) -> Option<String> {
        crate::movie::rating_label(self.vote_average)
    }

    /// Overview text, or the stock message when the provider has none
    pub fn overview_or_default(&self) -> &str {
        self.overview
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or("No overview available.")
    }

    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl CastMember {
    /// First credited role. Multi-role credits look like "Neo / Thomas Anderson".
    pub fn primary_character(&self) -> Option<&str> {
        let character = self.character.as_deref()?;
        let first = character.split('/').next().unwrap_or(character).trim();
        if first.is_empty() {
            None
        } else {
            Some(first)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub id: Option<MovieId>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

impl Credits {
    pub fn empty() -> Self {
        Self { id: None, cast: Vec::new() }
    }

    /// Leading cast members in billing order
    pub fn top_cast(&self, limit: usize) -> Vec<CastMember> {
        self.cast.iter().take(limit).cloned().collect()
    }
}
