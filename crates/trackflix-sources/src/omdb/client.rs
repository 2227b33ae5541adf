use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use trackflix_models::MovieDetail;
use tracing::debug;

use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::{MovieDirectory, SearchOutcome};

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self::with_timeout(api_key, base_url, None)
    }

    /// `timeout` of `None` leaves requests unbounded
    pub fn with_timeout(api_key: String, base_url: String, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: Arc::new(builder.build().unwrap_or_else(|_| Client::new())),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl MovieDirectory for OmdbClient {
    fn directory_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<SearchOutcome, SourceError> {
        debug!(query, "Searching OMDb");
        api::search_movies(&self.client, &self.base_url, &self.api_key, query).await
    }

    async fn get_detail(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        debug!(imdb_id, "Fetching OMDb detail");
        api::get_movie_detail(&self.client, &self.base_url, &self.api_key, imdb_id).await
    }
}
