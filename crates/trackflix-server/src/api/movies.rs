//! Watched-list endpoints. Every mutation answers with the full collection.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use trackflix_models::{SessionUser, WatchedEntry};
use trackflix_sources::watchlist::api::{AddMovieRequest, RemoveMovieRequest, UserMoviesQuery};
use tracing::info;

use crate::error::{ApiError, ApiJson};
use crate::store::normalize_email;
use crate::AppState;

fn ensure_owner<'a>(user: &SessionUser, email: &'a str) -> Result<&'a str, ApiError> {
    let email = normalize_email(email);
    if normalize_email(&user.email) != email {
        return Err(ApiError::Forbidden(email.to_string()));
    }
    Ok(email)
}

/// GET /user-movies?email=
pub async fn user_movies(
    State(state): State<AppState>,
    Query(query): Query<UserMoviesQuery>,
) -> Result<Json<Vec<WatchedEntry>>, ApiError> {
    let watched = state
        .store
        .find(normalize_email(&query.email))
        .await?
        .map(|user| user.watched_movies)
        .unwrap_or_default();
    Ok(Json(watched))
}

/// POST /add-movie
pub async fn add_movie(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ApiJson(body): ApiJson<AddMovieRequest>,
) -> Result<Json<Vec<WatchedEntry>>, ApiError> {
    let email = ensure_owner(&user, &body.email)?;

    let movie = body.movie;
    if movie.imdb_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Movie id is required".to_string()));
    }
    if !(1..=10).contains(&movie.user_rating) {
        return Err(ApiError::BadRequest(
            "User rating must be between 1 and 10".to_string(),
        ));
    }

    let imdb_id = movie.imdb_id.clone();
    let watched = state
        .store
        .add_movie(email, movie)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    info!(imdb_id = %imdb_id, count = watched.len(), "Movie added for {}", email);
    Ok(Json(watched))
}

/// POST /remove-movie
pub async fn remove_movie(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ApiJson(body): ApiJson<RemoveMovieRequest>,
) -> Result<Json<Vec<WatchedEntry>>, ApiError> {
    let email = ensure_owner(&user, &body.email)?;

    let watched = state
        .store
        .remove_movie(email, &body.imdb_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    info!(imdb_id = %body.imdb_id, count = watched.len(), "Movie removed for {}", email);
    Ok(Json(watched))
}
