use super::progress::Spinner;
use crate::context::AppContext;
use crate::output::Output;
use crate::render;
use crate::WatchlistCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use moviewatch_core::{FailureHook, StoreFailure, WatchlistStore};
use moviewatch_models::{MovieId, MovieSummary, WatchlistEntry};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Failures the store masked during this command
#[derive(Default)]
struct Failures {
    read: AtomicBool,
    write: AtomicBool,
    skipped: AtomicUsize,
}

impl Failures {
    fn read(&self) -> bool {
        self.read.load(Ordering::SeqCst)
    }

    fn write(&self) -> bool {
        self.write.load(Ordering::SeqCst)
    }

    fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }
}

/// Warning for backends that cannot keep changes beyond this command
fn persistence_warning(store: &WatchlistStore) -> Option<&'static str> {
    match store.storage_name() {
        None => Some("Watchlist storage is disabled; changes will not be kept"),
        Some("memory") => Some("Watchlist backend is 'memory'; changes last only for this command"),
        Some(_) => None,
    }
}

pub async fn run_watchlist(ctx: &AppContext, cmd: WatchlistCommands, output: &Output) -> Result<()> {
    // The store only logs failures; record them so the user hears about them too
    let failures = Arc::new(Failures::default());
    let sink = failures.clone();
    let hook: FailureHook = Arc::new(move |failure: &StoreFailure| match failure {
        StoreFailure::Read(_) | StoreFailure::Malformed(_) => {
            tracing::warn!(error = %failure, "Watchlist unreadable, treating as empty");
            sink.read.store(true, Ordering::SeqCst);
        }
        StoreFailure::InvalidEntry { .. } => {
            tracing::warn!(error = %failure, "Dropping unreadable watchlist entry");
            sink.skipped.fetch_add(1, Ordering::SeqCst);
        }
        StoreFailure::Encode(_) | StoreFailure::Write(_) => {
            tracing::error!(error = %failure, "Watchlist change was not saved");
            sink.write.store(true, Ordering::SeqCst);
        }
    });
    let store = ctx.watchlist_with_hook(hook);

    if let Some(warning) = persistence_warning(&store) {
        output.warn(warning);
    }

    match cmd {
        WatchlistCommands::List => list(&store, &failures, output),
        WatchlistCommands::Add { id, title } => {
            let movie = match title {
                Some(title) => MovieSummary::new(id, title),
                None => match fetch_summary(ctx, id, output).await? {
                    Some(movie) => movie,
                    None => {
                        output.warn(format!("Movie {} not found", id));
                        return Ok(());
                    }
                },
            };

            let already = store.is_member(id);
            let title = movie.title.clone();
            let entries = store.add(movie);
            let saved = report_write(&store, &failures, output);

            if already {
                output.info(format!("'{}' is already on your watchlist", title));
            } else if saved {
                output.success(format!("Added '{}' to your watchlist", title));
            }
            output.json(&json!({ "action": "add", "movie_id": id, "watchlist": entries }));
            Ok(())
        }
        WatchlistCommands::Remove { id } => {
            let title = title_of(&store.list(), id);
            let entries = store.remove(id);
            let saved = report_write(&store, &failures, output);

            match title {
                Some(title) if saved => {
                    output.success(format!("Removed '{}' from your watchlist", title))
                }
                Some(_) => {}
                None => output.info(format!("Movie {} is not on your watchlist", id)),
            }
            output.json(&json!({ "action": "remove", "movie_id": id, "watchlist": entries }));
            Ok(())
        }
        WatchlistCommands::Toggle { id } => {
            let entries = store.toggle_watched(id);
            let saved = report_write(&store, &failures, output);

            match entries.iter().find(|e| e.id() == id) {
                Some(entry) if saved => {
                    let state = if entry.watched { "watched" } else { "unwatched" };
                    output.success(format!("Marked '{}' as {}", entry.title(), state));
                }
                Some(_) => {}
                None => output.info(format!("Movie {} is not on your watchlist", id)),
            }
            output.json(&json!({ "action": "toggle", "movie_id": id, "watchlist": entries }));
            Ok(())
        }
        WatchlistCommands::Status { id } => {
            let member = store.is_member(id);
            let watched = store.is_watched(id);
            output.info(render::watchlist_status(member, watched));
            output.json(&json!({ "movie_id": id, "member": member, "watched": watched }));
            Ok(())
        }
    }
}

fn list(store: &WatchlistStore, failures: &Failures, output: &Output) -> Result<()> {
    let outcome = store.load();
    if outcome.is_failed() {
        output.warn("Stored watchlist could not be read; showing it as empty. The next change will overwrite it.");
    }
    if failures.skipped() > 0 {
        output.warn(format!(
            "{} stored entries could not be read and are not shown. The next change will drop them.",
            failures.skipped()
        ));
    }
    let entries = outcome.into_entries();

    output.json(&json!({ "watchlist": entries }));

    if !output.is_human() {
        return Ok(());
    }

    output.println(render::section_header("My Watchlist"));
    if entries.is_empty() {
        output.println("Your watchlist is empty. Add movies with 'moviewatch watchlist add <id>'.");
        return Ok(());
    }

    let watched = entries.iter().filter(|e| e.watched).count();
    output.println(render::watchlist_table(&entries).to_string());
    output.println(format!("{} movies, {} watched", entries.len(), watched));
    Ok(())
}

async fn fetch_summary(ctx: &AppContext, id: MovieId, output: &Output) -> Result<Option<MovieSummary>> {
    let discovery = ctx.discovery()?;
    let spinner = Spinner::start(format!("Loading movie {}...", id), output);
    let result = discovery.movie(id).await;
    spinner.finish();

    let view = result.map_err(|e| eyre!("{:#}", e))?;
    Ok(view.map(|v| v.details.summary()))
}

fn title_of(entries: &[WatchlistEntry], id: MovieId) -> Option<String> {
    entries.iter().find(|e| e.id() == id).map(|e| e.title().to_string())
}

/// Tell the user what the store masked. Returns whether the change was stored.
fn report_write(store: &WatchlistStore, failures: &Failures, output: &Output) -> bool {
    if failures.write() {
        output.error("Watchlist change could not be saved");
        return false;
    }
    if failures.read() {
        output.warn("Stored watchlist could not be read and was replaced");
    }
    if failures.skipped() > 0 {
        output.warn(format!("Dropped {} unreadable watchlist entries", failures.skipped()));
    }
    store.is_attached()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moviewatch_core::MemoryStorage;

    #[test]
    fn test_persistence_warning_by_backend() {
        assert!(persistence_warning(&WatchlistStore::detached()).unwrap().contains("disabled"));
        let memory = WatchlistStore::new(MemoryStorage::new());
        assert!(persistence_warning(&memory).unwrap().contains("only for this command"));

        let dir = tempfile::TempDir::new().unwrap();
        let file = WatchlistStore::new(moviewatch_core::FileStorage::new(dir.path()));
        assert_eq!(persistence_warning(&file), None);
    }
}
