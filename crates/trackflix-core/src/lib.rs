pub mod app;
pub mod detail;
pub mod search;
pub mod session;
pub mod summary;
pub mod title;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod fakes;

pub use app::TrackflixApp;
pub use detail::{CommitOutcome, DetailResolver, DetailState};
pub use search::{SearchController, SearchState};
pub use session::SessionState;
pub use summary::summarize;
pub use title::{TitleDisplay, TitleGuard};
pub use watchlist::{SyncStatus, WatchlistSynchronizer};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock shared view state. A panic in another holder leaves plain data
/// behind, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
