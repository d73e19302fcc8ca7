use comfy_table::{Attribute, Cell, Color, Table};
use moviewatch_catalog::ImageUrls;
use moviewatch_core::MovieView;
use moviewatch_models::{MovieId, MovieSummary, WatchlistEntry};
use owo_colors::OwoColorize;
use std::collections::HashSet;

pub fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

pub fn section_header(title: &str) -> String {
    format!("\n{}\n{}", title.bold().bright_cyan(), "─".repeat(title.chars().count()).bright_cyan())
}

/// "$1,234,567"
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

pub fn format_rating(label: Option<String>) -> String {
    label.map(|l| format!("{} / 10", l)).unwrap_or_else(|| "N/A".to_string())
}

/// Runtime line value, omitted when unknown or zero
pub fn format_runtime(runtime: Option<u32>) -> Option<String> {
    runtime.filter(|r| *r > 0).map(|r| format!("{} minutes", r))
}

fn year_cell(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Listing table with a marker for movies already on the watchlist
pub fn movie_table(movies: &[MovieSummary], on_watchlist: &HashSet<MovieId>) -> Table {
    let mut table = styled_table();
    table.set_header(header(&["ID", "Title", "Year", "Rating", "Watchlist"]));
    for movie in movies {
        let marker = if on_watchlist.contains(&movie.id) {
            Cell::new("✓").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(movie.id),
            Cell::new(&movie.title),
            Cell::new(year_cell(movie.release_year())),
            Cell::new(movie.rating_label().unwrap_or_else(|| "-".to_string())),
            marker,
        ]);
    }
    table
}

pub fn watchlist_table(entries: &[WatchlistEntry]) -> Table {
    let mut table = styled_table();
    table.set_header(header(&["#", "ID", "Title", "Year", "Rating", "Watched"]));
    for (idx, entry) in entries.iter().enumerate() {
        let watched = if entry.watched {
            Cell::new("✓ Watched").fg(Color::Green)
        } else {
            Cell::new("Unwatched").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(entry.id()),
            Cell::new(entry.title()),
            Cell::new(year_cell(entry.movie.release_year())),
            Cell::new(entry.movie.rating_label().unwrap_or_else(|| "-".to_string())),
            watched,
        ]);
    }
    table
}

/// Watchlist state as shown on the details page
pub fn watchlist_status(on_watchlist: bool, watched: bool) -> &'static str {
    match (on_watchlist, watched) {
        (false, _) => "Not on watchlist",
        (true, false) => "On watchlist",
        (true, true) => "On watchlist (watched)",
    }
}

fn labeled(label: &str, value: impl AsRef<str>) -> String {
    format!("{} {}", format!("{}:", label).bold(), value.as_ref())
}

/// Details page as printable lines
pub fn movie_details_lines(view: &MovieView, images: &ImageUrls, on_watchlist: bool, watched: bool) -> Vec<String> {
    let details = &view.details;
    let mut lines = Vec::new();

    let title = match details.release_year() {
        Some(year) => format!("{} ({})", details.title, year),
        None => details.title.clone(),
    };
    lines.push(format!("{}", title.bold().bright_white()));
    if let Some(tagline) = details.tagline() {
        lines.push(format!("{}", tagline.italic()));
    }
    lines.push(String::new());

    lines.push(labeled("Rating", format_rating(details.rating_label())));
    lines.push(labeled("Watchlist", watchlist_status(on_watchlist, watched)));

    lines.push(section_header("Overview"));
    lines.push(details.overview_or_default().to_string());

    if !view.cast.is_empty() {
        lines.push(section_header("Cast"));
        for member in &view.cast {
            match member.primary_character() {
                Some(character) => lines.push(format!("  {} ({})", member.name, character)),
                None => lines.push(format!("  {}", member.name)),
            }
        }
    }

    if !details.genres.is_empty() {
        lines.push(section_header("Genres"));
        let names: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(format!("  {}", names.join(", ")));
    }

    lines.push(String::new());
    if let Some(runtime) = format_runtime(details.runtime) {
        lines.push(labeled("Runtime", runtime));
    }
    if details.budget > 0 {
        lines.push(labeled("Budget", format_money(details.budget)));
    }
    if details.revenue > 0 {
        lines.push(labeled("Revenue", format_money(details.revenue)));
    }
    if !details.production_companies.is_empty() {
        let names: Vec<&str> = details.production_companies.iter().map(|c| c.name.as_str()).collect();
        lines.push(labeled("Production Companies", names.join(", ")));
    }

    lines.push(labeled("Poster", images.poster(details.poster_path.as_deref())));
    if let Some(backdrop) = images.backdrop(details.backdrop_path.as_deref()) {
        lines.push(labeled("Backdrop", backdrop));
    }

    lines
}
