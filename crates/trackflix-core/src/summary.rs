use trackflix_models::{WatchedEntry, WatchlistSummary};

/// Arithmetic mean; an empty input has mean 0
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

pub fn summarize(watched: &[WatchedEntry]) -> WatchlistSummary {
    WatchlistSummary {
        count: watched.len(),
        avg_imdb_rating: mean(watched.iter().map(|m| m.imdb_rating)),
        avg_user_rating: mean(watched.iter().map(|m| f64::from(m.user_rating))),
        avg_runtime: mean(watched.iter().map(|m| f64::from(m.runtime))),
    }
}
