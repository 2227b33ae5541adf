//! HTTP handlers of the watchlist server

pub mod auth;
pub mod health;
pub mod movies;

pub use auth::{current_user, login, logout, require_session, signup, SESSION_USER_KEY};
pub use health::health_routes;
pub use movies::{add_movie, remove_movie, user_movies};
