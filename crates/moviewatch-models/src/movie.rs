use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Catalog-assigned movie identifier (TMDB id)
pub type MovieId = u64;

/// Snapshot of a catalog entry as it looked when it was fetched or saved.
///
/// The named fields are the ones the tool reads; anything else the provider
/// returned is kept in `extra` and written back untouched. Older blobs used
/// camelCase names, which are still accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, alias = "posterPath")]
    pub poster_path: Option<String>,
    #[serde(default, alias = "voteAverage")]
    pub vote_average: Option<f64>,
    #[serde(default, alias = "releaseDate")]
    pub release_date: Option<String>,
    #[serde(flatten, default)]
    pub extra: Map<String, Value>,
}

impl MovieSummary {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            vote_average: None,
            release_date: None,
            extra: Map::new(),
        }
    }

    pub fn with_poster_path(mut self, path: impl Into<String>) -> Self {
        self.poster_path = Some(path.into());
        self
    }

    pub fn with_vote_average(mut self, vote_average: f64) -> Self {
        self.vote_average = Some(vote_average);
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    /// Year of the release date, if the date is present and well-formed
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Vote average with one decimal. A zero average means "no votes" and is hidden.
    pub fn rating_label(&self) -> Option<String> {
        rating_label(self.vote_average)
    }
}

/// Missing and `null` both read as the type's default
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse the year out of an ISO `YYYY-MM-DD` date
pub fn release_year(date: Option<&str>) -> Option<i32> {
    let date = date?.trim();
    if date.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(|d| d.year())
}

pub fn rating_label(vote_average: Option<f64>) -> Option<String> {
    vote_average
        .filter(|v| *v > 0.0 && v.is_finite())
        .map(|v| format!("{:.1}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_year() {
        let movie = MovieSummary::new(1, "A").with_release_date("1999-03-31");
        assert_eq!(movie.release_year(), Some(1999));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(Some("soon")), None);
        assert_eq!(release_year(None), None);
    }

    #[test]
    fn test_rating_label_hides_zero() {
        assert_eq!(rating_label(Some(7.26)), Some("7.3".to_string()));
        assert_eq!(rating_label(Some(8.0)), Some("8.0".to_string()));
        assert_eq!(rating_label(Some(0.0)), None);
        assert_eq!(rating_label(None), None);
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let json = r#"{"id":603,"title":"The Matrix","poster_path":"/m.jpg","vote_average":8.2,"release_date":"1999-03-31","adult":false,"genre_ids":[28,878]}"#;
        let movie: MovieSummary = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.poster_path.as_deref(), Some("/m.jpg"));
        assert_eq!(movie.extra.get("adult"), Some(&Value::Bool(false)));
        assert!(movie.extra.contains_key("genre_ids"));

        let back = serde_json::to_value(&movie).unwrap();
        assert_eq!(back["genre_ids"], serde_json::json!([28, 878]));
        assert_eq!(back["title"], "The Matrix");
    }

    #[test]
    fn test_camel_case_aliases() {
        let json = r#"{"id":1,"title":"A","posterPath":"/a.jpg","voteAverage":6.5,"releaseDate":"2001-01-01"}"#;
        let movie: MovieSummary = serde_json::from_str(json).unwrap();
        assert_eq!(movie.poster_path.as_deref(), Some("/a.jpg"));
        assert_eq!(movie.vote_average, Some(6.5));
        assert_eq!(movie.release_year(), Some(2001));
        assert!(movie.extra.is_empty());
    }

    #[test]
    fn test_missing_or_null_title_reads_as_empty() {
        let movie: MovieSummary = serde_json::from_str(r#"{"id":2}"#).unwrap();
        assert_eq!(movie.title, "");
        let movie: MovieSummary = serde_json::from_str(r#"{"id":3,"title":null}"#).unwrap();
        assert_eq!(movie.title, "");
        assert!(serde_json::from_str::<MovieSummary>(r#"{"title":"no id"}"#).is_err());
    }
}
