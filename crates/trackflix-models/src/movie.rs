use serde::{Deserialize, Serialize};

/// One row of a search result set. Lives only as long as the query that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieCandidate {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
}

/// Full record for a single title, refetched on every selection change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub runtime: String,     // "<N> min" or "N/A"
    pub imdb_rating: String, // numeric string, "N/A" when unrated
    pub plot: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
    pub released: String,
}
