use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::watched::WatchedEntry;

/// Identity stored in the server-side session and returned by `GET /user`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One persisted document per user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDocument {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String, // bcrypt hash, never the plain password
    #[serde(rename = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "watchedMovies", default)]
    pub watched_movies: Vec<WatchedEntry>,
}

impl UserDocument {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn has_movie(&self, imdb_id: &str) -> bool {
        self.watched_movies.iter().any(|m| m.imdb_id == imdb_id)
    }
}
