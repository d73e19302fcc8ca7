use moviewatch_models::{Credits, MovieCategory, MovieDetails, MovieId, MoviePage};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use crate::error::CatalogError;

/// TMDB's "The resource you requested could not be found." code
const STATUS_CODE_NOT_FOUND: i64 = 34;

/// Error body TMDB sends alongside non-2xx responses (and occasionally 2xx ones)
#[derive(Debug, Deserialize)]
struct TmdbStatus {
    status_code: Option<i64>,
    status_message: Option<String>,
}

/// Connection settings shared by every request
#[derive(Debug, Clone)]
pub struct ApiContext<'a> {
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub language: Option<&'a str>,
}

impl<'a> ApiContext<'a> {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("api_key", self.api_key.to_string())];
        if let Some(language) = self.language {
            params.push(("language", language.to_string()));
        }
        params
    }
}

/// Turn a raw response into `T`, mapping TMDB's error conventions.
///
/// 404 and a body with `status_code: 34` both mean the resource is missing.
pub fn parse_response<T: DeserializeOwned>(status: u16, body: &str, context: &str) -> Result<T, CatalogError> {
    let tmdb_status = serde_json::from_str::<TmdbStatus>(body).ok();

    if tmdb_status.as_ref().and_then(|s| s.status_code) == Some(STATUS_CODE_NOT_FOUND) || status == 404 {
        return Err(CatalogError::NotFound(context.to_string()));
    }

    if !(200..300).contains(&status) {
        let message = tmdb_status
            .and_then(|s| s.status_message)
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(CatalogError::Status {
            status,
            context: context.to_string(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|source| CatalogError::Decode {
        context: context.to_string(),
        source,
    })
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    ctx: &ApiContext<'_>,
    path: &str,
    extra: &[(&'static str, String)],
    context: &str,
) -> Result<T, CatalogError> {
    let url = ctx.url(path);
    debug!(url = %url, context, "TMDB request");

    let response = client
        .get(&url)
        .query(&ctx.query())
        .query(extra)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;

    if !(200..300).contains(&status) {
        warn!(status, context, "TMDB request failed");
    }

    parse_response(status, &body, context)
}

/// First page is 1; TMDB rejects 0
fn page_param(page: u32) -> (&'static str, String) {
    ("page", page.max(1).to_string())
}

pub async fn get_movie_list(
    client: &Client,
    ctx: &ApiContext<'_>,
    category: MovieCategory,
    page: u32,
) -> Result<MoviePage, CatalogError> {
    let context = format!("{} movies", category.slug().replace('_', " "));
    get_json(client, ctx, category.path(), &[page_param(page)], &context).await
}

pub async fn get_movie_details(
    client: &Client,
    ctx: &ApiContext<'_>,
    id: MovieId,
) -> Result<MovieDetails, CatalogError> {
    get_json(client, ctx, &format!("movie/{}", id), &[], &format!("movie {} details", id)).await
}

pub async fn get_movie_credits(
    client: &Client,
    ctx: &ApiContext<'_>,
    id: MovieId,
) -> Result<Credits, CatalogError> {
    get_json(client, ctx, &format!("movie/{}/credits", id), &[], &format!("movie {} credits", id)).await
}

pub async fn search_movies(
    client: &Client,
    ctx: &ApiContext<'_>,
    query: &str,
    page: u32,
) -> Result<MoviePage, CatalogError> {
    let params = [
        ("query", query.to_string()),
        page_param(page),
        ("include_adult", "false".to_string()),
    ];
    get_json(client, ctx, "search/movie", &params, &format!("search '{}'", query)).await
}
