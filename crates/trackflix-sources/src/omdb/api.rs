use reqwest::Client;
use serde::Deserialize;
use trackflix_models::{MovieCandidate, MovieDetail};
use tracing::debug;

use crate::error::SourceError;
use crate::traits::SearchOutcome;

#[derive(Debug, Deserialize)]
pub(crate) struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OmdbDetail {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

/// OMDb reports "Movie not found!" / "Too many results." with Response=False;
/// both mean there is nothing to show for the query.
pub(crate) fn map_search_response(resp: OmdbSearchResponse) -> Result<SearchOutcome, SourceError> {
    if resp.response != "True" {
        let reason = resp.error.unwrap_or_default();
        if reason.contains("API key") || reason.contains("limit reached") {
            return Err(SourceError::InvalidResponse(reason));
        }
        debug!("OMDb search returned no results: {}", reason);
        return Ok(SearchOutcome::NotFound);
    }

    let candidates: Vec<MovieCandidate> = resp
        .search
        .into_iter()
        .map(|item| MovieCandidate {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: item.poster,
        })
        .collect();

    if candidates.is_empty() {
        return Ok(SearchOutcome::NotFound);
    }
    Ok(SearchOutcome::Found(candidates))
}

pub(crate) fn map_detail_response(imdb_id: &str, resp: OmdbDetail) -> Result<MovieDetail, SourceError> {
    if resp.response != "True" {
        let reason = resp.error.unwrap_or_else(|| "unknown error".to_string());
        return Err(SourceError::NotFound(format!("{}: {}", imdb_id, reason)));
    }

    Ok(MovieDetail {
        imdb_id: if resp.imdb_id.is_empty() { imdb_id.to_string() } else { resp.imdb_id },
        title: resp.title,
        year: resp.year,
        poster: resp.poster,
        runtime: resp.runtime,
        imdb_rating: resp.imdb_rating,
        plot: resp.plot,
        actors: resp.actors,
        director: resp.director,
        genre: resp.genre,
        released: resp.released,
    })
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    base_url: &str,
    params: &[(&str, &str)],
) -> Result<T, SourceError> {
    let response = client
        .get(base_url)
        .query(params)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            endpoint: "omdb".to_string(),
            status: status.as_u16(),
            message: error_text,
        });
    }

    Ok(response.json().await?)
}

/// Search titles by free text
pub async fn search_movies(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<SearchOutcome, SourceError> {
    let resp: OmdbSearchResponse =
        get_json(client, base_url, &[("apikey", api_key), ("s", query)]).await?;
    map_search_response(resp)
}

/// Fetch the full record for one IMDb identifier
pub async fn get_movie_detail(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetail, SourceError> {
    let resp: OmdbDetail =
        get_json(client, base_url, &[("apikey", api_key), ("i", imdb_id)]).await?;
    map_detail_response(imdb_id, resp)
}
