use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use trackflix_models::{MovieDetail, WatchedEntry};
use trackflix_sources::MovieDirectory;
use tracing::{debug, warn};

use crate::lock;
use crate::title::{TitleDisplay, TitleGuard};
use crate::watchlist::{SyncStatus, WatchlistSynchronizer};

pub const DETAIL_FAILED_MESSAGE: &str = "Could not load movie details";

/// Lifecycle of the detail view for the current selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DetailState {
    Idle,
    Loading,
    Ready(MovieDetail),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Preconditions not met; nothing was sent
    Skipped,
    /// The entry was handed to the watchlist and the detail view closed
    Submitted(SyncStatus),
}

#[derive(Debug)]
struct DetailInner {
    selected: Option<String>,
    generation: u64,
    state: DetailState,
    title_guard: Option<TitleGuard>,
}

/// Resolves the selected identifier into a displayed movie detail.
///
/// Transitions happen only when the selected identifier changes or the
/// resolver is dropped. Each transition first tears down the previous one:
/// the pending fetch is aborted and the title label is released.
pub struct DetailResolver {
    directory: Arc<dyn MovieDirectory>,
    titles: TitleDisplay,
    inner: Arc<Mutex<DetailInner>>,
    in_flight: Option<JoinHandle<()>>,
    user_rating: u8,
    decisions: u32,
}

impl DetailResolver {
    pub fn new(directory: Arc<dyn MovieDirectory>, titles: TitleDisplay) -> Self {
        Self {
            directory,
            titles,
            inner: Arc::new(Mutex::new(DetailInner {
                selected: None,
                generation: 0,
                state: DetailState::Idle,
                title_guard: None,
            })),
            in_flight: None,
            user_rating: 0,
            decisions: 0,
        }
    }

    pub fn selected(&self) -> Option<String> {
        lock(&self.inner).selected.clone()
    }

    pub fn state(&self) -> DetailState {
        lock(&self.inner).state.clone()
    }

    pub fn detail(&self) -> Option<MovieDetail> {
        match &lock(&self.inner).state {
            DetailState::Ready(detail) => Some(detail.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(lock(&self.inner).state, DetailState::Loading)
    }

    /// Rating currently set on the control (0 = unset)
    pub fn user_rating(&self) -> u8 {
        self.user_rating
    }

    /// How many times the rating changed since this title was selected
    pub fn decision_count(&self) -> u32 {
        self.decisions
    }

    pub fn is_watched(&self, watched: &[WatchedEntry]) -> bool {
        self.existing_entry(watched).is_some()
    }

    pub fn existing_user_rating(&self, watched: &[WatchedEntry]) -> Option<u8> {
        self.existing_entry(watched).map(|entry| entry.user_rating)
    }

    fn existing_entry<'a>(&self, watched: &'a [WatchedEntry]) -> Option<&'a WatchedEntry> {
        let selected = self.selected()?;
        watched.iter().find(|entry| entry.imdb_id == selected)
    }

    /// Move to a new selection. Re-selecting the current id is a no-op.
    pub fn select(&mut self, imdb_id: Option<String>) {
        if self.selected() == imdb_id {
            return;
        }

        self.teardown();
        self.user_rating = 0;
        self.decisions = 0;

        let generation = {
            let mut inner = lock(&self.inner);
            inner.selected = imdb_id.clone();
            inner.state = if imdb_id.is_some() {
                DetailState::Loading
            } else {
                DetailState::Idle
            };
            inner.generation
        };

        let Some(imdb_id) = imdb_id else {
            return;
        };

        let directory = Arc::clone(&self.directory);
        let inner = Arc::clone(&self.inner);
        let titles = self.titles.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = directory.get_detail(&imdb_id).await;

            let mut inner = lock(&inner);
            if inner.generation != generation {
                debug!(imdb_id = %imdb_id, "Discarding detail for superseded selection");
                return;
            }
            match result {
                Ok(detail) => {
                    if !detail.title.is_empty() {
                        inner.title_guard = Some(titles.show(&detail.title));
                    }
                    inner.state = DetailState::Ready(detail);
                }
                Err(e) => {
                    warn!(directory = directory.directory_name(), imdb_id = %imdb_id, "Detail fetch failed: {}", e);
                    inner.state = DetailState::Failed(DETAIL_FAILED_MESSAGE.to_string());
                }
            }
        }));
    }

    /// Close the detail view
    pub fn close(&mut self) {
        self.select(None);
    }

    /// Wait for the pending detail fetch, if any
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Detail task ended abnormally: {}", e);
                }
            }
        }
    }

    /// Record a rating-control change. Only distinct, non-zero values on an
    /// unwatched title count as a decision.
    pub fn set_rating(&mut self, rating: u8, watched: &[WatchedEntry]) {
        if rating > 10 || self.is_watched(watched) {
            return;
        }
        if rating != self.user_rating {
            self.user_rating = rating;
            if rating > 0 {
                self.decisions += 1;
            }
        }
    }

    /// Build the entry `commit` would send, or `None` when committing is not allowed
    pub fn prepare_commit(&self, rating: u8, watched: &[WatchedEntry]) -> Option<WatchedEntry> {
        if rating == 0 || rating > 10 || self.is_watched(watched) {
            return None;
        }
        let detail = self.detail()?;
        Some(WatchedEntry::from_detail(&detail, rating, self.decisions))
    }

    /// Save the displayed movie with `rating`, then close the detail view
    pub async fn commit(&mut self, rating: u8, watchlist: &mut WatchlistSynchronizer) -> CommitOutcome {
        let Some(entry) = self.prepare_commit(rating, watchlist.watched()) else {
            debug!(rating, "Commit ignored");
            return CommitOutcome::Skipped;
        };

        let status = watchlist.append(entry).await;
        self.close();
        CommitOutcome::Submitted(status)
    }

    /// Abort the pending fetch and release the title. Bumping the generation
    /// under the same lock keeps a fetch that already resolved from applying.
    fn teardown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        let mut inner = lock(&self.inner);
        inner.generation += 1;
        inner.title_guard = None;
    }
}

impl Drop for DetailResolver {
    fn drop(&mut self) {
        self.teardown();
    }
}
