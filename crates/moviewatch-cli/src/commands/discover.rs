use super::progress::Spinner;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviewatch_models::{MovieCategory, MovieId, MoviePage};
use serde_json::json;
use std::collections::HashSet;

pub async fn run_discover(
    ctx: &AppContext,
    category: Option<MovieCategory>,
    page: u32,
    refresh: bool,
    output: &Output,
) -> Result<()> {
    let discovery = ctx.discovery()?;

    match category {
        Some(category) => {
            let spinner = Spinner::start(format!("Loading {}...", category), output);
            let result = discovery.category(category, page, refresh).await;
            spinner.finish();
            let listing = result.map_err(|e| eyre!("{:#}", e))?;

            output.json(&json!({
                "category": category.slug(),
                "page": listing.page,
                "total_pages": listing.total_pages,
                "results": listing.results,
            }));

            if output.is_human() {
                let on_watchlist = watchlist_ids(ctx);
                print_section(category, &listing, &on_watchlist, output);
                output.println(format!("Page {} of {}", listing.page, listing.total_pages));
            }
        }
        None => {
            if refresh {
                // The home feed reads through the cache; drop it so every section is refetched
                if let Err(e) = ctx.catalog_cache().clear() {
                    output.warn(format!("Failed to clear cached listings: {}", e));
                }
            }

            let spinner = Spinner::start("Loading movies...", output);
            let result = discovery.home().await;
            spinner.finish();
            let feed = result.map_err(|e| eyre!("{:#}", e))?;

            output.json(&serde_json::to_value(&feed).map_err(|e| eyre!("Failed to serialize listings: {}", e))?);

            if output.is_human() {
                let on_watchlist = watchlist_ids(ctx);
                for (category, listing) in feed.sections() {
                    print_section(category, listing, &on_watchlist, output);
                }
            }
        }
    }

    Ok(())
}

fn watchlist_ids(ctx: &AppContext) -> HashSet<MovieId> {
    ctx.watchlist().list().iter().map(|e| e.id()).collect()
}

fn print_section(category: MovieCategory, listing: &MoviePage, on_watchlist: &HashSet<MovieId>, output: &Output) {
    output.println(render::section_header(category.display_name()));
    if listing.is_empty() {
        output.println("No movies found.");
    } else {
        output.println(render::movie_table(&listing.results, on_watchlist).to_string());
    }
}
