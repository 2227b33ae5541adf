use async_trait::async_trait;
use trackflix_models::{MovieCandidate, MovieDetail, SessionUser, WatchedEntry};

use crate::error::SourceError;

/// Result of a title search. "Not found" is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<MovieCandidate>),
    NotFound,
}

impl SearchOutcome {
    pub fn into_candidates(self) -> Vec<MovieCandidate> {
        match self {
            SearchOutcome::Found(candidates) => candidates,
            SearchOutcome::NotFound => Vec::new(),
        }
    }
}

/// Read-only third-party movie catalog
#[async_trait]
pub trait MovieDirectory: Send + Sync {
    fn directory_name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<SearchOutcome, SourceError>;
    async fn get_detail(&self, imdb_id: &str) -> Result<MovieDetail, SourceError>;
}

/// Per-user watched collection held by the server.
///
/// Every mutation answers with the complete post-mutation collection; callers
/// adopt it as-is instead of predicting the result locally.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn user_movies(&self, email: &str) -> Result<Vec<WatchedEntry>, SourceError>;
    async fn add_movie(&self, email: &str, movie: &WatchedEntry) -> Result<Vec<WatchedEntry>, SourceError>;
    async fn remove_movie(&self, email: &str, imdb_id: &str) -> Result<Vec<WatchedEntry>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// The server answered but refused the credentials
    Rejected(String),
}

/// Login/logout against the session guard
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn signup(&self, name: &str, email: &str, password: &str) -> Result<SessionUser, SourceError>;
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SourceError>;
    async fn logout(&self) -> Result<(), SourceError>;
    async fn current_user(&self) -> Result<Option<SessionUser>, SourceError>;
}
