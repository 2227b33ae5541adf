use serde::{Deserialize, Serialize};

/// Aggregate statistics over a watched collection.
/// Means over an empty collection are 0, never NaN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchlistSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}
