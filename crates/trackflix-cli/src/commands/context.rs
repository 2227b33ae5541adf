use color_eyre::eyre::{eyre, Report};
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use trackflix_config::{Config, ConfigError, PathManager, SessionCache};
use trackflix_core::{SessionState, TrackflixApp, WatchlistSynchronizer};
use trackflix_sources::{MovieDirectory, OmdbClient, SourceError, WatchlistHttpClient};
use tracing::debug;

/// Everything a command needs: config, the cached login and the HTTP clients
pub struct CommandContext {
    pub paths: PathManager,
    pub config: Config,
    pub cache: SessionCache,
    pub backend: Arc<WatchlistHttpClient>,
    pub session: SessionState,
}

impl CommandContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let session_file = paths.session_file();
        let cache = SessionCache::open(session_file.clone())
            .map_err(|e| eyre!("Failed to load session from {}: {}", session_file.display(), e))?;

        let mut backend = WatchlistHttpClient::new(&config.client.backend_url, request_timeout(&config))?;
        if let Some(cookie) = cache.session_cookie() {
            debug!("Restoring cached session cookie");
            backend = backend.with_session_cookie(cookie);
        }
        let session = SessionState::restored(cache.user_email().cloned());

        Ok(Self {
            paths,
            config,
            cache,
            backend: Arc::new(backend),
            session,
        })
    }

    pub fn directory(&self) -> Result<Arc<dyn MovieDirectory>> {
        self.config.validate_client().map_err(|e| match e {
            ConfigError::MissingApiKey => eyre!(
                "OMDb API key is not configured. Run 'trackflix config init' or set TRACKFLIX_OMDB_API_KEY"
            ),
            other => eyre!("{}", other),
        })?;
        Ok(Arc::new(OmdbClient::with_timeout(
            self.config.omdb.api_key.clone(),
            self.config.omdb.base_url.clone(),
            request_timeout(&self.config),
        )))
    }

    /// Cached email, or an error telling the user to log in
    pub fn require_login(&self) -> Result<String> {
        self.session
            .email()
            .ok_or_else(|| eyre!("Not logged in. Run 'trackflix login' first"))
    }

    /// Persist the email and the cookie the server just issued
    pub fn remember_login(&mut self, email: &str) -> Result<()> {
        self.cache
            .set_login(email.to_string(), self.backend.session_cookie());
        self.cache
            .save()
            .map_err(|e| eyre!("Failed to save session: {}", e))
    }

    /// Turn a watchlist-server failure into a report, pointing at the
    /// configured URL when the server could not be reached at all
    pub fn backend_error(&self, action: &str, error: SourceError) -> Report {
        if error.is_transport() {
            eyre!(
                "{} failed: could not reach the watchlist server at {} ({}). Is 'trackflix serve' running?",
                action,
                self.config.client.backend_url,
                error
            )
        } else {
            eyre!("{} failed: {}", action, error)
        }
    }

    pub fn forget_login(&mut self) -> Result<()> {
        self.session.clear();
        self.cache.clear();
        self.cache
            .save()
            .map_err(|e| eyre!("Failed to save session: {}", e))
    }

    pub fn app(&self) -> Result<TrackflixApp> {
        Ok(TrackflixApp::new(
            self.directory()?,
            self.backend.clone(),
            self.session.clone(),
        ))
    }

    pub fn watchlist(&self) -> WatchlistSynchronizer {
        WatchlistSynchronizer::new(self.backend.clone(), self.session.clone())
    }
}

fn request_timeout(config: &Config) -> Option<Duration> {
    config.client.request_timeout_secs.map(Duration::from_secs)
}
