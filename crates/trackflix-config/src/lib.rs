pub mod config;
pub mod paths;
pub mod session_cache;

pub use config::{ClientConfig, Config, ConfigError, OmdbConfig, ServerConfig};
pub use paths::{container_base_path, PathManager};
pub use session_cache::SessionCache;
