use super::progress::Spinner;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviewatch_models::MovieId;
use serde_json::json;

pub async fn run_movie(ctx: &AppContext, id: MovieId, output: &Output) -> Result<()> {
    let discovery = ctx.discovery()?;

    let spinner = Spinner::start(format!("Loading movie {}...", id), output);
    let result = discovery.movie(id).await;
    spinner.finish();

    let Some(view) = result.map_err(|e| eyre!("{:#}", e))? else {
        output.warn(format!("Movie {} not found", id));
        return Ok(());
    };

    let store = ctx.watchlist();
    let on_watchlist = store.is_member(id);
    let watched = on_watchlist && store.is_watched(id);
    let images = discovery.catalog().images();

    let cast: Vec<_> = view
        .cast
        .iter()
        .map(|member| {
            json!({
                "id": member.id,
                "name": member.name,
                "character": member.primary_character(),
                "profile_url": images.profile(member.profile_path.as_deref()),
            })
        })
        .collect();

    output.json(&json!({
        "movie": view.details,
        "cast": cast,
        "rating": view.details.rating_label(),
        "release_year": view.details.release_year(),
        "poster_url": images.poster(view.details.poster_path.as_deref()),
        "backdrop_url": images.backdrop(view.details.backdrop_path.as_deref()),
        "watchlist": {
            "member": on_watchlist,
            "watched": watched,
        },
    }));

    if output.is_human() {
        for line in render::movie_details_lines(&view, images, on_watchlist, watched) {
            output.println(line);
        }
    }

    Ok(())
}
