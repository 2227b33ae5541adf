//! Request and response bodies of the watchlist server's HTTP surface.
//!
//! The server crate deserializes the same types, so both sides agree on
//! field names by construction.

use serde::{Deserialize, Serialize};
use trackflix_models::{SessionUser, WatchedEntry};

/// Body the server sends back on a successful login
pub const LOGIN_SUCCESS: &str = "Success";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMovieRequest {
    pub email: String,
    pub movie: WatchedEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveMovieRequest {
    pub email: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMoviesQuery {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
