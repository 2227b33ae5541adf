use std::sync::Arc;
use trackflix_models::{WatchedEntry, WatchlistSummary};
use trackflix_sources::{MovieDirectory, WatchlistStore};
use tracing::debug;

use crate::detail::{CommitOutcome, DetailResolver};
use crate::search::SearchController;
use crate::session::SessionState;
use crate::title::TitleDisplay;
use crate::watchlist::{SyncStatus, WatchlistSynchronizer};

/// One search box, one detail view and one watched list wired together.
///
/// Only the synchronizer ever replaces the watched collection; the other
/// components read it by slice.
pub struct TrackflixApp {
    session: SessionState,
    titles: TitleDisplay,
    search: SearchController,
    detail: DetailResolver,
    watchlist: WatchlistSynchronizer,
    mounted: bool,
}

impl TrackflixApp {
    pub fn new(
        directory: Arc<dyn MovieDirectory>,
        store: Arc<dyn WatchlistStore>,
        session: SessionState,
    ) -> Self {
        let titles = TitleDisplay::new();
        Self {
            search: SearchController::new(Arc::clone(&directory)),
            detail: DetailResolver::new(directory, titles.clone()),
            watchlist: WatchlistSynchronizer::new(store, session.clone()),
            session,
            titles,
            mounted: false,
        }
    }

    /// Load the watched list. Later calls are no-ops.
    pub async fn mount(&mut self) -> SyncStatus {
        if self.mounted {
            debug!("Already mounted");
            return SyncStatus::Unchanged;
        }
        self.mounted = true;
        self.watchlist.load().await
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn titles(&self) -> &TitleDisplay {
        &self.titles
    }

    pub fn title(&self) -> String {
        self.titles.current()
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn detail(&self) -> &DetailResolver {
        &self.detail
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.search.set_query(text);
    }

    pub async fn settle_search(&mut self) {
        self.search.settle().await;
    }

    pub async fn settle_detail(&mut self) {
        self.detail.settle().await;
    }

    /// Toggle the selection and point the detail view at whatever is now selected
    pub fn select_movie(&mut self, imdb_id: &str) {
        self.search.select_movie(imdb_id);
        self.detail.select(self.search.selected());
    }

    pub fn close_movie(&mut self) {
        self.search.close_movie();
        self.detail.close();
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.detail.set_rating(rating, self.watchlist.watched());
    }

    pub fn is_selected_watched(&self) -> bool {
        self.detail
            .selected()
            .is_some_and(|imdb_id| self.watchlist.contains(&imdb_id))
    }

    pub fn existing_user_rating(&self) -> Option<u8> {
        self.detail.existing_user_rating(self.watchlist.watched())
    }

    pub async fn commit(&mut self, rating: u8) -> CommitOutcome {
        let outcome = self.detail.commit(rating, &mut self.watchlist).await;
        if matches!(outcome, CommitOutcome::Submitted(_)) {
            self.search.close_movie();
        }
        outcome
    }

    pub async fn reload(&mut self) -> SyncStatus {
        self.watchlist.load().await
    }

    pub async fn remove(&mut self, imdb_id: &str) -> SyncStatus {
        self.watchlist.remove(imdb_id).await
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        self.watchlist.watched()
    }

    pub fn summary(&self) -> WatchlistSummary {
        self.watchlist.summary()
    }
}
