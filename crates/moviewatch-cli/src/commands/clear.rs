use super::{progress, prompts};
use crate::context::AppContext;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;

pub async fn run_clear(
    ctx: &AppContext,
    all: bool,
    cache: bool,
    watchlist: bool,
    credentials: bool,
    yes: bool,
    output: &Output,
) -> Result<()> {
    if all {
        clear_cache(ctx, output)?;
        clear_watchlist(ctx, yes, output)?;
        clear_credentials(ctx, output)?;
        output.success("Cache, watchlist and credentials cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if cache {
        clear_cache(ctx, output)?;
        cleared_anything = true;
    }

    if watchlist {
        clear_watchlist(ctx, yes, output)?;
        cleared_anything = true;
    }

    if credentials {
        clear_credentials(ctx, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --cache, --watchlist, --credentials, or --all");
        output.println("\nExample: moviewatch clear --cache");
    }

    Ok(())
}

fn clear_cache(ctx: &AppContext, output: &Output) -> Result<()> {
    let cache = ctx.catalog_cache();
    let removed = cache
        .clear()
        .map_err(|e| eyre!("Failed to clear listing cache at {}: {}", cache.dir().display(), e))?;

    if removed == 0 {
        output.info("No cached listings found to clear");
    } else {
        output.success(format!("Cleared {} cached listing page(s): {}", removed, cache.dir().display()));
    }
    Ok(())
}

fn clear_watchlist(ctx: &AppContext, yes: bool, output: &Output) -> Result<()> {
    let store = ctx.watchlist();
    match store.storage_name() {
        None => {
            output.info("Watchlist storage is disabled, nothing to clear");
            return Ok(());
        }
        Some("memory") => {
            output.info("Watchlist backend is 'memory', nothing is stored to clear");
            return Ok(());
        }
        Some(_) => {}
    }

    let count = store.list().len();
    if count > 0 && !yes {
        if !progress::is_interactive() {
            return Err(eyre!("Refusing to empty a watchlist of {} movies without --yes", count));
        }
        let prompt = format!("Remove all {} movies from your watchlist?", count);
        if !prompts::prompt_yes_no(&prompt, false)? {
            output.info("Watchlist left unchanged");
            return Ok(());
        }
    }

    if store.clear() {
        output.success(format!("Cleared watchlist ({} movies removed)", count));
        Ok(())
    } else {
        Err(eyre!("Failed to clear the watchlist; see the log for details"))
    }
}

fn clear_credentials(ctx: &AppContext, output: &Output) -> Result<()> {
    let credentials_file = ctx.paths.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file)
            .map_err(|e| eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e))?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}
