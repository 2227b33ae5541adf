use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use serde_json::json;
use trackflix_core::{CommitOutcome, DetailState, SearchState, SyncStatus, TrackflixApp};
use trackflix_models::{MovieDetail, WatchedEntry, WatchlistSummary};
use tracing::debug;

use super::context::CommandContext;
use super::prompts;
use super::ui::Spinner;
use crate::output::{styled_table, Output};

pub async fn run_search(query: String, output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    let mut app = ctx.app()?;

    app.set_query(query.as_str());
    let spinner = Spinner::start(output, format!("Searching for '{}'...", query.trim()));
    app.settle_search().await;
    spinner.finish();

    let state = app.search().state();
    if !output.is_human() {
        output.json(&json!({ "type": "search", "query": query, "result": state }));
        return Ok(());
    }

    match state {
        SearchState::Idle => output.info("Enter a title to search for"),
        SearchState::Loading => output.warn("Search did not finish"),
        SearchState::Failed(message) => {
            output.error(&message);
            return Err(eyre!(message));
        }
        SearchState::Ready(candidates) => {
            output.info(format!("Found {} results", candidates.len()));
            if !candidates.is_empty() {
                let mut table = styled_table(&["IMDb ID", "Title", "Year"]);
                for candidate in &candidates {
                    table.add_row(vec![
                        Cell::new(&candidate.imdb_id),
                        Cell::new(&candidate.title),
                        Cell::new(&candidate.year),
                    ]);
                }
                output.table(&table);
            }
        }
    }
    Ok(())
}

/// Mount the watched list when someone is logged in, then open `imdb_id`
async fn open_detail(ctx: &CommandContext, imdb_id: &str, output: &Output) -> Result<TrackflixApp> {
    let mut app = ctx.app()?;
    let spinner = Spinner::start(output, "Loading movie...");
    if ctx.session.is_logged_in() && !app.mount().await.is_applied() {
        debug!("Watched list unavailable; showing {} without watched state", imdb_id);
    }
    app.select_movie(imdb_id);
    app.settle_detail().await;
    spinner.finish();

    match app.detail().state() {
        DetailState::Ready(_) => Ok(app),
        DetailState::Failed(message) => Err(eyre!("{}: {}", message, imdb_id)),
        _ => Err(eyre!("Movie {} did not load", imdb_id)),
    }
}

pub async fn run_show(imdb_id: String, output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    let app = open_detail(&ctx, &imdb_id, output).await?;
    let detail = app.detail().detail().ok_or_else(|| eyre!("Movie {} did not load", imdb_id))?;

    if !output.is_human() {
        output.json(&json!({
            "type": "movie",
            "movie": detail,
            "watched": app.is_selected_watched(),
            "user_rating": app.existing_user_rating(),
        }));
        return Ok(());
    }

    print_detail(&app, &detail, output);
    Ok(())
}

fn print_detail(app: &TrackflixApp, detail: &MovieDetail, output: &Output) {
    if output.is_quiet() {
        return;
    }
    println!("\n{}", app.title().bright_cyan().bold());

    let mut table = styled_table(&["Field", "Value"]);
    for (field, value) in [
        ("Title", &detail.title),
        ("Year", &detail.year),
        ("Released", &detail.released),
        ("Runtime", &detail.runtime),
        ("Genre", &detail.genre),
        ("IMDb rating", &detail.imdb_rating),
        ("Director", &detail.director),
        ("Actors", &detail.actors),
        ("Plot", &detail.plot),
    ] {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    output.table(&table);

    match app.existing_user_rating() {
        Some(rating) => output.success(format!("You rated this movie {} / 10", rating)),
        None => output.info("Not in your watched list yet".bright_black().to_string()),
    }
}

/// Interactive rating: every distinct rating entered counts as a decision
pub async fn run_rate(imdb_id: String, output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    ctx.require_login()?;
    let mut app = open_detail(&ctx, &imdb_id, output).await?;
    let detail = app.detail().detail().ok_or_else(|| eyre!("Movie {} did not load", imdb_id))?;
    print_detail(&app, &detail, output);

    if app.is_selected_watched() {
        return Ok(());
    }

    while let Some(rating) = prompts::prompt_rating("Your rating (1-10, empty when done)", output)? {
        app.set_rating(rating);
        output.info(format!(
            "Rating {} ({} decision{})",
            app.detail().user_rating(),
            app.detail().decision_count(),
            if app.detail().decision_count() == 1 { "" } else { "s" }
        ));
    }

    let rating = app.detail().user_rating();
    if rating == 0 {
        output.info("No rating given, nothing saved");
        return Ok(());
    }
    if !prompts::prompt_yes_no(&format!("Add {} to your list with {} / 10?", detail.title, rating), true, output)? {
        return Ok(());
    }

    report_commit(app.commit(rating).await, &detail.title, output)
}

pub async fn run_add(imdb_id: String, rating: u8, output: &Output) -> Result<()> {
    if !(1..=10).contains(&rating) {
        return Err(eyre!("Rating must be between 1 and 10"));
    }
    let ctx = CommandContext::load()?;
    ctx.require_login()?;
    let mut app = open_detail(&ctx, &imdb_id, output).await?;
    let title = app.detail().detail().map(|d| d.title).unwrap_or_else(|| imdb_id.clone());

    if app.is_selected_watched() {
        output.warn(format!("{} is already in your watched list", title));
        return Ok(());
    }

    app.set_rating(rating);
    let spinner = Spinner::start(output, "Saving...");
    let outcome = app.commit(rating).await;
    spinner.finish();
    report_commit(outcome, &title, output)
}

fn report_commit(outcome: CommitOutcome, title: &str, output: &Output) -> Result<()> {
    match outcome {
        CommitOutcome::Submitted(SyncStatus::Applied) => {
            output.success(format!("Added {} to your watched list", title));
            Ok(())
        }
        CommitOutcome::Submitted(SyncStatus::Unchanged) => {
            Err(eyre!("The server did not accept {}; see the log for details", title))
        }
        CommitOutcome::Skipped => {
            output.warn(format!("{} was not added", title));
            Ok(())
        }
    }
}

pub async fn run_remove(imdb_id: String, output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    ctx.require_login()?;
    let mut watchlist = ctx.watchlist();

    let spinner = Spinner::start(output, "Removing...");
    let status = watchlist.remove(&imdb_id).await;
    spinner.finish();

    match status {
        SyncStatus::Applied => {
            output.success(format!("Removed {} ({} movies left)", imdb_id, watchlist.watched().len()));
            Ok(())
        }
        SyncStatus::Unchanged => Err(eyre!("Could not remove {}; see the log for details", imdb_id)),
    }
}

pub async fn run_list(output: &Output) -> Result<()> {
    let ctx = CommandContext::load()?;
    let email = ctx.require_login()?;
    let mut watchlist = ctx.watchlist();

    let spinner = Spinner::start(output, "Loading watched list...");
    let status = watchlist.load().await;
    spinner.finish();
    if status == SyncStatus::Unchanged {
        return Err(eyre!("Could not load the watched list for {}", email));
    }

    let summary = watchlist.summary();
    if !output.is_human() {
        output.json(&json!({
            "type": "watched",
            "movies": watchlist.watched(),
            "summary": summary,
        }));
        return Ok(());
    }

    print_summary(&summary, output);
    if !watchlist.watched().is_empty() {
        output.table(&watched_table(watchlist.watched()));
    }
    Ok(())
}

fn print_summary(summary: &WatchlistSummary, output: &Output) {
    output.info(format!(
        "{} movies | IMDb {} | You {} | {}",
        summary.count,
        format_rating(summary.avg_imdb_rating),
        format_rating(summary.avg_user_rating),
        format_runtime(summary.avg_runtime),
    ));
}

fn watched_table(watched: &[WatchedEntry]) -> comfy_table::Table {
    let mut table = styled_table(&["IMDb ID", "Title", "Year", "IMDb", "You", "Runtime"]);
    for movie in watched {
        table.add_row(vec![
            Cell::new(&movie.imdb_id),
            Cell::new(&movie.title),
            Cell::new(&movie.year),
            Cell::new(format_rating(movie.imdb_rating)),
            Cell::new(movie.user_rating),
            Cell::new(format_runtime(f64::from(movie.runtime))),
        ]);
    }
    table
}

fn format_rating(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_runtime(minutes: f64) -> String {
    format!("{} min", minutes.round() as u64)
}
