use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OMDb api_key is not configured")]
    MissingApiKey,
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("Invalid server setting: {0}")]
    InvalidServer(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Browser origin allowed to send credentialed requests
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
    #[serde(default)]
    pub secure_cookies: bool,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Overrides the data directory chosen by `PathManager`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OmdbConfig {
    pub api_key: String,
    #[serde(default = "default_omdb_base_url")]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Unset means requests may hang indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_bind_address() -> String {
    "127.0.0.1:4000".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_session_ttl_hours() -> u32 {
    24
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_omdb_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_backend_url() -> String {
    "http://127.0.0.1:4000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origin: default_allowed_origin(),
            session_ttl_hours: default_session_ttl_hours(),
            secure_cookies: false,
            bcrypt_cost: default_bcrypt_cost(),
            data_dir: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            omdb: OmdbConfig {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                base_url: default_omdb_base_url(),
            },
            client: ClientConfig::default(),
        }
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults (plus env overrides)
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load_from_file(path);
        }
        debug!("No config file at {}, using defaults", path.display());
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Environment wins over the file for secrets and deployment URLs
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("TRACKFLIX_OMDB_API_KEY") {
            if !key.is_empty() {
                self.omdb.api_key = key;
            }
        }
        if let Ok(url) = std::env::var("TRACKFLIX_BACKEND_URL") {
            if !url.is_empty() {
                self.client.backend_url = url;
            }
        }
    }

    pub fn is_omdb_configured(&self) -> bool {
        !self.omdb.api_key.is_empty() && self.omdb.api_key != PLACEHOLDER_API_KEY
    }

    /// Settings needed by the client side (search, detail, watchlist calls)
    pub fn validate_client(&self) -> Result<(), ConfigError> {
        if !self.is_omdb_configured() {
            return Err(ConfigError::MissingApiKey);
        }
        if !is_http_url(&self.omdb.base_url) {
            return Err(ConfigError::InvalidUrl {
                field: "omdb.base_url",
                value: self.omdb.base_url.clone(),
            });
        }
        if !is_http_url(&self.client.backend_url) {
            return Err(ConfigError::InvalidUrl {
                field: "client.backend_url",
                value: self.client.backend_url.clone(),
            });
        }
        Ok(())
    }

    /// Settings needed to run the watchlist server
    pub fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.session_ttl_hours == 0 {
            return Err(ConfigError::InvalidServer(
                "session_ttl_hours must be greater than zero".to_string(),
            ));
        }
        if !(4..=31).contains(&self.server.bcrypt_cost) {
            return Err(ConfigError::InvalidServer(format!(
                "bcrypt_cost must be between 4 and 31, got {}",
                self.server.bcrypt_cost
            )));
        }
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidServer(format!(
                "bind_address is not a socket address: {}",
                self.server.bind_address
            )));
        }
        if !is_http_url(&self.server.allowed_origin) {
            return Err(ConfigError::InvalidUrl {
                field: "server.allowed_origin",
                value: self.server.allowed_origin.clone(),
            });
        }
        Ok(())
    }
}
