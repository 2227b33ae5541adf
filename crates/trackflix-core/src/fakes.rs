//! In-memory collaborators for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use tokio::sync::Notify;
use trackflix_models::{MovieCandidate, MovieDetail, SessionUser, WatchedEntry};
use trackflix_sources::{
    AccountService, LoginOutcome, MovieDirectory, SearchOutcome, SourceError, WatchlistStore,
};

use crate::lock;

pub fn candidate(imdb_id: &str, title: &str) -> MovieCandidate {
    MovieCandidate {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: "N/A".to_string(),
    }
}

pub fn detail(imdb_id: &str, title: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster: "N/A".to_string(),
        runtime: "148 min".to_string(),
        imdb_rating: "8.8".to_string(),
        plot: "A thief who steals corporate secrets.".to_string(),
        actors: "Leonardo DiCaprio".to_string(),
        director: "Christopher Nolan".to_string(),
        genre: "Action, Sci-Fi".to_string(),
        released: "16 Jul 2010".to_string(),
    }
}

pub fn watched_entry(imdb_id: &str, imdb_rating: f64, user_rating: u8, runtime: u32) -> WatchedEntry {
    WatchedEntry {
        imdb_id: imdb_id.to_string(),
        title: format!("Movie {}", imdb_id),
        year: "2010".to_string(),
        poster: "N/A".to_string(),
        imdb_rating,
        runtime,
        user_rating,
        count_rating_decisions: 1,
    }
}

/// Poll `done` until it holds, failing the test after about a second
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..500 {
        if done() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}

/// Parks the calling worker thread until opened. Aborting the task does not
/// interrupt it, so the answer is delivered after the caller moved on.
#[derive(Default)]
pub struct BlockingGate {
    entered: AtomicBool,
    open: Mutex<bool>,
    opened: Condvar,
}

impl BlockingGate {
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        *lock(&self.open) = true;
        self.opened.notify_all();
    }

    fn wait(&self) {
        self.entered.store(true, Ordering::SeqCst);
        let mut open = lock(&self.open);
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }
}

/// Catalog with canned answers. A gated key blocks until its `Notify` fires.
#[derive(Default)]
pub struct FakeDirectory {
    results: HashMap<String, Vec<MovieCandidate>>,
    details: HashMap<String, MovieDetail>,
    gates: HashMap<String, Arc<Notify>>,
    blocking_gates: HashMap<String, Arc<BlockingGate>>,
    failing: bool,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, results: Vec<MovieCandidate>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn with_detail(mut self, detail: MovieDetail) -> Self {
        self.details.insert(detail.imdb_id.clone(), detail);
        self
    }

    /// Hold the answer for a query or imdb id until `gate` is notified
    pub fn with_gate(mut self, key: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(key.to_string(), gate);
        self
    }

    /// Hold the answer for a key on a thread-blocking gate
    pub fn with_blocking_gate(mut self, key: &str, gate: Arc<BlockingGate>) -> Self {
        self.blocking_gates.insert(key.to_string(), gate);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn wait_gate(&self, key: &str) {
        if let Some(gate) = self.blocking_gates.get(key) {
            gate.wait();
        }
        if let Some(gate) = self.gates.get(key) {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl MovieDirectory for FakeDirectory {
    fn directory_name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &str) -> Result<SearchOutcome, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate(query).await;
        if self.failing {
            return Err(SourceError::InvalidResponse("directory offline".to_string()));
        }
        Ok(match self.results.get(query) {
            Some(results) => SearchOutcome::Found(results.clone()),
            None => SearchOutcome::NotFound,
        })
    }

    async fn get_detail(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_gate(imdb_id).await;
        if self.failing {
            return Err(SourceError::InvalidResponse("directory offline".to_string()));
        }
        self.details
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(imdb_id.to_string()))
    }
}

/// Watchlist server stand-in with the same idempotent insert rule
#[derive(Default)]
pub struct FakeStore {
    users: Mutex<HashMap<String, Vec<WatchedEntry>>>,
    failing: AtomicBool,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, email: &str, watched: Vec<WatchedEntry>) {
        lock(&self.users).insert(email.to_string(), watched);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, email: &str) -> Vec<WatchedEntry> {
        lock(&self.users).get(email).cloned().unwrap_or_default()
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Status {
                endpoint: "fake".to_string(),
                status: 500,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for FakeStore {
    async fn user_movies(&self, email: &str) -> Result<Vec<WatchedEntry>, SourceError> {
        self.check()?;
        Ok(self.stored(email))
    }

    async fn add_movie(&self, email: &str, movie: &WatchedEntry) -> Result<Vec<WatchedEntry>, SourceError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut users = lock(&self.users);
        let watched = users.entry(email.to_string()).or_default();
        if !watched.iter().any(|m| m.imdb_id == movie.imdb_id) {
            watched.push(movie.clone());
        }
        Ok(watched.clone())
    }

    async fn remove_movie(&self, email: &str, imdb_id: &str) -> Result<Vec<WatchedEntry>, SourceError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut users = lock(&self.users);
        let watched = users.entry(email.to_string()).or_default();
        watched.retain(|m| m.imdb_id != imdb_id);
        Ok(watched.clone())
    }
}

/// Single-account login service
pub struct FakeAccounts {
    email: String,
    password: String,
    logout_fails: AtomicBool,
}

impl FakeAccounts {
    pub fn with_user(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            logout_fails: AtomicBool::new(false),
        }
    }

    pub fn fail_logout(&self) {
        self.logout_fails.store(true, Ordering::SeqCst);
    }

    fn user(&self) -> SessionUser {
        SessionUser {
            id: "user-1".to_string(),
            name: "Ana".to_string(),
            email: self.email.clone(),
        }
    }
}

#[async_trait]
impl AccountService for FakeAccounts {
    async fn signup(&self, _name: &str, _email: &str, _password: &str) -> Result<SessionUser, SourceError> {
        Ok(self.user())
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SourceError> {
        if email == self.email && password == self.password {
            Ok(LoginOutcome::Success)
        } else {
            Ok(LoginOutcome::Rejected("Invalid email or password".to_string()))
        }
    }

    async fn logout(&self) -> Result<(), SourceError> {
        if self.logout_fails.load(Ordering::SeqCst) {
            return Err(SourceError::Unauthorized);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>, SourceError> {
        Ok(Some(self.user()))
    }
}
