use serde::Serialize;
use std::sync::Arc;
use trackflix_models::{WatchedEntry, WatchlistSummary};
use trackflix_sources::WatchlistStore;
use tracing::{debug, error, info, warn};

use crate::session::SessionState;
use crate::summary::summarize;

/// Whether an operation replaced the local collection
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Applied,
    Unchanged,
}

impl SyncStatus {
    pub fn is_applied(self) -> bool {
        self == SyncStatus::Applied
    }
}

/// Local copy of the user's watched collection.
///
/// The server's answer is the only thing ever written into `watched`: after
/// load, append and remove alike the whole collection is replaced by what the
/// store returned. Failures are logged and leave the last known collection in
/// place. `&mut self` on every mutation keeps one request in flight at a time.
pub struct WatchlistSynchronizer {
    store: Arc<dyn WatchlistStore>,
    session: SessionState,
    watched: Vec<WatchedEntry>,
}

impl WatchlistSynchronizer {
    pub fn new(store: Arc<dyn WatchlistStore>, session: SessionState) -> Self {
        Self {
            store,
            session,
            watched: Vec::new(),
        }
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        &self.watched
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.watched.iter().any(|m| m.imdb_id == imdb_id)
    }

    pub fn summary(&self) -> WatchlistSummary {
        summarize(&self.watched)
    }

    fn email(&self, operation: &str) -> Option<String> {
        let email = self.session.email();
        if email.is_none() {
            warn!("Skipping watchlist {}: no user is logged in", operation);
        }
        email
    }

    fn replace(&mut self, collection: Vec<WatchedEntry>) -> SyncStatus {
        debug!(
            before = self.watched.len(),
            after = collection.len(),
            "Adopting server watchlist"
        );
        self.watched = collection;
        SyncStatus::Applied
    }

    /// Fetch the full collection and replace the local one
    pub async fn load(&mut self) -> SyncStatus {
        let Some(email) = self.email("load") else {
            return SyncStatus::Unchanged;
        };
        match self.store.user_movies(&email).await {
            Ok(collection) => {
                info!("Loaded {} watched movies", collection.len());
                self.replace(collection)
            }
            Err(e) => {
                error!("Error fetching movies: {}", e);
                SyncStatus::Unchanged
            }
        }
    }

    /// Ask the store to append `entry`; duplicates are the store's business
    pub async fn append(&mut self, entry: WatchedEntry) -> SyncStatus {
        let Some(email) = self.email("append") else {
            return SyncStatus::Unchanged;
        };
        match self.store.add_movie(&email, &entry).await {
            Ok(collection) => self.replace(collection),
            Err(e) => {
                error!(imdb_id = %entry.imdb_id, "Error adding movie: {}", e);
                SyncStatus::Unchanged
            }
        }
    }

    pub async fn remove(&mut self, imdb_id: &str) -> SyncStatus {
        let Some(email) = self.email("remove") else {
            return SyncStatus::Unchanged;
        };
        match self.store.remove_movie(&email, imdb_id).await {
            Ok(collection) => self.replace(collection),
            Err(e) => {
                error!(imdb_id, "Error removing movie: {}", e);
                SyncStatus::Unchanged
            }
        }
    }
}
