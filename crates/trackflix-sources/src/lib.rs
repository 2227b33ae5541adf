pub mod error;
pub mod omdb;
pub mod traits;
pub mod watchlist;

pub use error::SourceError;
pub use omdb::OmdbClient;
pub use traits::{AccountService, LoginOutcome, MovieDirectory, SearchOutcome, WatchlistStore};
pub use watchlist::WatchlistHttpClient;
