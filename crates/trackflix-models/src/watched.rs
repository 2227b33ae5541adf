use serde::{Deserialize, Serialize};

use crate::movie::MovieDetail;

/// A movie the user rated and saved.
///
/// Field names on the wire match the documents the watchlist server persists,
/// so entries round-trip unchanged between store, server and client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: f64,
    #[serde(default)]
    pub runtime: u32, // minutes
    #[serde(rename = "userRating")]
    pub user_rating: u8, // 1-10
    #[serde(rename = "countRatingDecisions", default)]
    pub count_rating_decisions: u32,
}

impl WatchedEntry {
    /// Build an entry from a fetched detail record and the user's decision
    pub fn from_detail(detail: &MovieDetail, user_rating: u8, count_rating_decisions: u32) -> Self {
        Self {
            imdb_id: detail.imdb_id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: parse_rating(&detail.imdb_rating),
            runtime: parse_runtime_minutes(&detail.runtime),
            user_rating,
            count_rating_decisions,
        }
    }
}

/// Parse a runtime string such as "142 min" into minutes.
/// Anything without a leading number ("N/A", "") yields 0.
pub fn parse_runtime_minutes(runtime: &str) -> u32 {
    runtime
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Parse the directory's aggregate rating ("7.4"), 0.0 when unrated
pub fn parse_rating(rating: &str) -> f64 {
    rating
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .unwrap_or(0.0)
}
