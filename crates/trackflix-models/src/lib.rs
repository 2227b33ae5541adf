pub mod movie;
pub mod summary;
pub mod user;
pub mod watched;

pub use movie::{MovieCandidate, MovieDetail};
pub use summary::WatchlistSummary;
pub use user::{SessionUser, UserDocument};
pub use watched::{parse_rating, parse_runtime_minutes, WatchedEntry};

/// Title shown whenever no movie detail is on screen
pub const DEFAULT_TITLE: &str = "TrackFlix";
