use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl SourceError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SourceError::Unauthorized)
    }

    /// Network-level failure (connection refused, reset, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}
