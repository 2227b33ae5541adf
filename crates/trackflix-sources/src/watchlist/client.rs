use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;
use trackflix_models::{SessionUser, WatchedEntry};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::traits::{AccountService, LoginOutcome, WatchlistStore};
use crate::watchlist::api::{
    AddMovieRequest, ErrorBody, LoginRequest, RemoveMovieRequest, SignupRequest, UserResponse,
    LOGIN_SUCCESS,
};

/// HTTP client for the watchlist server.
///
/// Cookies live in a shared jar so the session issued by `/login` rides along
/// on every later call. `session_cookie` / `with_session_cookie` let a new
/// process pick the session back up.
#[derive(Clone)]
pub struct WatchlistHttpClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl WatchlistHttpClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, SourceError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        // Endpoints are joined relative to the base, which needs a trailing slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let jar = Arc::new(Jar::default());

        let mut builder = Client::builder().cookie_provider(jar.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, jar, base_url })
    }

    /// Restore a cookie previously returned by [`Self::session_cookie`]
    pub fn with_session_cookie(self, cookie: &str) -> Self {
        for pair in cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base_url);
        }
        self
    }

    /// Cookie header value currently held for the server, if any
    pub fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    fn url(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn collection(response: Response, endpoint: &str) -> Result<Vec<WatchedEntry>, SourceError> {
        let response = check_status(response, endpoint).await?;
        Ok(response.json().await?)
    }
}

/// Map non-2xx answers to `SourceError`, reading the server's `{error}` body when present
async fn check_status(response: Response, endpoint: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(SourceError::Unauthorized);
    }

    let message = error_message(response).await;
    Err(SourceError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}

async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
        return body.error;
    }
    if let Ok(plain) = serde_json::from_str::<String>(&text) {
        return plain;
    }
    text
}

#[async_trait]
impl WatchlistStore for WatchlistHttpClient {
    async fn user_movies(&self, email: &str) -> Result<Vec<WatchedEntry>, SourceError> {
        let response = self
            .client
            .get(self.url("user-movies")?)
            .query(&[("email", email)])
            .send()
            .await?;
        Self::collection(response, "user-movies").await
    }

    async fn add_movie(&self, email: &str, movie: &WatchedEntry) -> Result<Vec<WatchedEntry>, SourceError> {
        debug!(imdb_id = %movie.imdb_id, "Adding movie to watchlist");
        let body = AddMovieRequest {
            email: email.to_string(),
            movie: movie.clone(),
        };
        let response = self
            .client
            .post(self.url("add-movie")?)
            .json(&body)
            .send()
            .await?;
        Self::collection(response, "add-movie").await
    }

    async fn remove_movie(&self, email: &str, imdb_id: &str) -> Result<Vec<WatchedEntry>, SourceError> {
        debug!(imdb_id, "Removing movie from watchlist");
        let body = RemoveMovieRequest {
            email: email.to_string(),
            imdb_id: imdb_id.to_string(),
        };
        let response = self
            .client
            .post(self.url("remove-movie")?)
            .json(&body)
            .send()
            .await?;
        Self::collection(response, "remove-movie").await
    }
}

#[async_trait]
impl AccountService for WatchlistHttpClient {
    async fn signup(&self, name: &str, email: &str, password: &str) -> Result<SessionUser, SourceError> {
        let body = SignupRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("signup")?)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response, "signup").await?;
        Ok(response.json().await?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SourceError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("login")?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            return Ok(LoginOutcome::Rejected(error_message(response).await));
        }
        let response = check_status(response, "login").await?;

        let indicator: String = response.json().await?;
        if indicator == LOGIN_SUCCESS {
            info!("Logged in as {}", email);
            Ok(LoginOutcome::Success)
        } else {
            Ok(LoginOutcome::Rejected(indicator))
        }
    }

    async fn logout(&self) -> Result<(), SourceError> {
        let response = self.client.post(self.url("logout")?).send().await?;
        check_status(response, "logout").await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>, SourceError> {
        let response = self.client.get(self.url("user")?).send().await?;
        match check_status(response, "user").await {
            Ok(response) => {
                let body: UserResponse = response.json().await?;
                Ok(Some(body.user))
            }
            Err(SourceError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
