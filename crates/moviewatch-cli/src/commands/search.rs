use super::progress::Spinner;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use std::collections::HashSet;

pub async fn run_search(ctx: &AppContext, query: &str, page: u32, output: &Output) -> Result<()> {
    if query.trim().is_empty() {
        output.warn("Search query is empty");
        return Ok(());
    }

    let discovery = ctx.discovery()?;

    let spinner = Spinner::start(format!("Searching for '{}'...", query.trim()), output);
    let result = discovery.search(query, page).await;
    spinner.finish();
    let results = result.map_err(|e| eyre!("{:#}", e))?;

    output.json(&json!({
        "query": query.trim(),
        "page": results.page,
        "total_pages": results.total_pages,
        "total_results": results.total_results,
        "results": results.results,
    }));

    if results.is_empty() {
        output.info(format!("No movies found for '{}'", query.trim()));
        return Ok(());
    }

    if output.is_human() {
        let on_watchlist: HashSet<_> = ctx.watchlist().list().iter().map(|e| e.id()).collect();
        output.println(render::section_header(&format!("Results for '{}'", query.trim())));
        output.println(render::movie_table(&results.results, &on_watchlist).to_string());
        output.println(format!(
            "Page {} of {} ({} results)",
            results.page, results.total_pages, results.total_results
        ));
    }

    Ok(())
}
