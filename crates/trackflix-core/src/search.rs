use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use trackflix_models::MovieCandidate;
use trackflix_sources::MovieDirectory;
use tracing::{debug, warn};

use crate::lock;

/// Message shown in place of the result list when the directory cannot be reached
pub const SEARCH_FAILED_MESSAGE: &str = "Something went wrong while fetching movies";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Loading,
    Ready(Vec<MovieCandidate>),
    Failed(String),
}

#[derive(Debug)]
struct SearchInner {
    query: String,
    generation: u64,
    state: SearchState,
    selected: Option<String>,
}

/// Owns the query text, the candidate list it produced and the single selected
/// candidate.
///
/// Last query wins: each fetch carries the generation it was started for and
/// is only applied if no newer query arrived meanwhile. Superseded fetches are
/// also aborted. `set_query` spawns onto the current tokio runtime.
pub struct SearchController {
    directory: Arc<dyn MovieDirectory>,
    inner: Arc<Mutex<SearchInner>>,
    in_flight: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(directory: Arc<dyn MovieDirectory>) -> Self {
        Self {
            directory,
            inner: Arc::new(Mutex::new(SearchInner {
                query: String::new(),
                generation: 0,
                state: SearchState::Idle,
                selected: None,
            })),
            in_flight: None,
        }
    }

    pub fn query(&self) -> String {
        lock(&self.inner).query.clone()
    }

    pub fn state(&self) -> SearchState {
        lock(&self.inner).state.clone()
    }

    /// Candidates currently on screen; empty unless a search completed
    pub fn results(&self) -> Vec<MovieCandidate> {
        match &lock(&self.inner).state {
            SearchState::Ready(candidates) => candidates.clone(),
            _ => Vec::new(),
        }
    }

    pub fn result_count(&self) -> usize {
        match &lock(&self.inner).state {
            SearchState::Ready(candidates) => candidates.len(),
            _ => 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(lock(&self.inner).state, SearchState::Loading)
    }

    pub fn selected(&self) -> Option<String> {
        lock(&self.inner).selected.clone()
    }

    /// Replace the query and start fetching its candidates.
    /// A blank query clears the results without contacting the directory.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let query = text.into();

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let generation = {
            let mut inner = lock(&self.inner);
            inner.generation += 1;
            inner.query = query.clone();
            if query.trim().is_empty() {
                inner.state = SearchState::Idle;
                return;
            }
            inner.state = SearchState::Loading;
            inner.generation
        };

        let directory = Arc::clone(&self.directory);
        let inner = Arc::clone(&self.inner);
        self.in_flight = Some(tokio::spawn(async move {
            let state = match directory.search(query.trim()).await {
                Ok(outcome) => SearchState::Ready(outcome.into_candidates()),
                Err(e) => {
                    warn!(directory = directory.directory_name(), query = %query, "Search failed: {}", e);
                    SearchState::Failed(SEARCH_FAILED_MESSAGE.to_string())
                }
            };
            apply_if_current(&inner, generation, state);
        }));
    }

    /// Wait for the current search, if any, to finish
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Search task ended abnormally: {}", e);
                }
            }
        }
    }

    /// Toggle selection: picking the selected id again closes it
    pub fn select_movie(&mut self, imdb_id: &str) {
        let mut inner = lock(&self.inner);
        inner.selected = match inner.selected.as_deref() {
            Some(current) if current == imdb_id => None,
            _ => Some(imdb_id.to_string()),
        };
    }

    pub fn close_movie(&mut self) {
        lock(&self.inner).selected = None;
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

/// Store `state` only if `generation` is still the latest query
fn apply_if_current(inner: &Mutex<SearchInner>, generation: u64, state: SearchState) -> bool {
    let mut inner = lock(inner);
    if inner.generation != generation {
        debug!(
            stale = generation,
            current = inner.generation,
            "Discarding superseded search result"
        );
        return false;
    }
    inner.state = state;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{candidate, wait_until, BlockingGate, FakeDirectory};
    use tokio::sync::Notify;

    fn controller(directory: FakeDirectory) -> SearchController {
        SearchController::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn test_search_applies_results() {
        let directory = FakeDirectory::new()
            .with_results("inception", vec![candidate("tt1375666", "Inception")]);
        let mut search = controller(directory);

        search.set_query("inception");
        assert!(search.is_loading());
        search.settle().await;

        assert_eq!(search.query(), "inception");
        assert_eq!(search.result_count(), 1);
        assert_eq!(search.results()[0].imdb_id, "tt1375666");
    }

    #[tokio::test]
    async fn test_empty_query_clears_without_fetch() {
        let directory = Arc::new(
            FakeDirectory::new().with_results("heat", vec![candidate("tt0113277", "Heat")]),
        );
        let mut search = SearchController::new(directory.clone());

        search.set_query("heat");
        search.settle().await;
        assert_eq!(search.result_count(), 1);

        search.set_query("   ");
        search.settle().await;
        assert_eq!(search.state(), SearchState::Idle);
        assert!(search.results().is_empty());
        assert_eq!(directory.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_zero_results() {
        let mut search = controller(FakeDirectory::new());

        search.set_query("zzzzzz");
        search.settle().await;

        assert_eq!(search.state(), SearchState::Ready(Vec::new()));
        assert_eq!(search.result_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_becomes_message() {
        let mut search = controller(FakeDirectory::new().failing());

        search.set_query("matrix");
        search.settle().await;

        assert_eq!(
            search.state(),
            SearchState::Failed(SEARCH_FAILED_MESSAGE.to_string())
        );
        assert!(search.results().is_empty());
    }

    #[tokio::test]
    async fn test_superseded_query_never_applies() {
        let gate = Arc::new(Notify::new());
        let directory = FakeDirectory::new()
            .with_results("matrix", vec![candidate("tt0133093", "The Matrix")])
            .with_results("inception", vec![candidate("tt1375666", "Inception")])
            .with_gate("matrix", gate.clone());
        let mut search = controller(directory);

        search.set_query("matrix");
        tokio::task::yield_now().await;
        search.set_query("inception");
        search.settle().await;

        // Let the slow response for the old query resolve after the new one
        gate.notify_waiters();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        let results = search.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].imdb_id, "tt1375666");
        assert_eq!(search.query(), "inception");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_old_answer_arriving_while_new_query_pending_is_dropped() {
        let old_gate = Arc::new(BlockingGate::default());
        let new_gate = Arc::new(Notify::new());
        let directory = Arc::new(
            FakeDirectory::new()
                .with_results("matrix", vec![candidate("tt0133093", "The Matrix")])
                .with_results("inception", vec![candidate("tt1375666", "Inception")])
                .with_blocking_gate("matrix", old_gate.clone())
                .with_gate("inception", new_gate.clone()),
        );
        let mut search = SearchController::new(directory.clone());

        search.set_query("matrix");
        wait_until(|| old_gate.is_entered()).await;
        search.set_query("inception");

        // "matrix" answers first; only this test, the controller and the
        // pending "inception" task still hold the directory afterwards
        old_gate.open();
        wait_until(|| Arc::strong_count(&directory) == 3).await;
        assert!(search.is_loading());
        assert!(search.results().is_empty());

        new_gate.notify_one();
        search.settle().await;
        let results = search.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].imdb_id, "tt1375666");
        assert_eq!(directory.search_calls(), 2);
    }

    #[test]
    fn test_stale_generation_is_discarded() {
        let inner = Mutex::new(SearchInner {
            query: "new".to_string(),
            generation: 2,
            state: SearchState::Loading,
            selected: None,
        });

        let stale = SearchState::Ready(vec![candidate("tt0000001", "Old")]);
        assert!(!apply_if_current(&inner, 1, stale));
        assert_eq!(lock(&inner).state, SearchState::Loading);

        let fresh = SearchState::Ready(vec![candidate("tt0000002", "New")]);
        assert!(apply_if_current(&inner, 2, fresh.clone()));
        assert_eq!(lock(&inner).state, fresh);
    }

    #[tokio::test]
    async fn test_select_same_id_twice_clears() {
        let mut search = controller(FakeDirectory::new());

        search.select_movie("tt1375666");
        assert_eq!(search.selected().as_deref(), Some("tt1375666"));

        search.select_movie("tt1375666");
        assert!(search.selected().is_none());
    }

    #[tokio::test]
    async fn test_select_other_id_replaces() {
        let mut search = controller(FakeDirectory::new());

        search.select_movie("tt1375666");
        search.select_movie("tt0133093");
        assert_eq!(search.selected().as_deref(), Some("tt0133093"));

        search.close_movie();
        assert!(search.selected().is_none());
    }
}
