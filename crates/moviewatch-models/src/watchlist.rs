use serde::{Deserialize, Serialize};
use crate::movie::{null_as_default, MovieId, MovieSummary};

/// One movie on the user's watchlist.
///
/// Serialized flat: the summary's fields followed by `watched`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    #[serde(flatten)]
    pub movie: MovieSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub watched: bool,
}

impl WatchlistEntry {
    /// New, unwatched entry. A `watched` key carried in the summary's
    /// passthrough fields is dropped so the entry flag is the only one written.
    pub fn from_summary(mut movie: MovieSummary) -> Self {
        movie.extra.remove("watched");
        Self { movie, watched: false }
    }

    pub fn id(&self) -> MovieId {
        self.movie.id
    }

    pub fn title(&self) -> &str {
        &self.movie.title
    }
}

impl From<MovieSummary> for WatchlistEntry {
    fn from(movie: MovieSummary) -> Self {
        Self::from_summary(movie)
    }
}
