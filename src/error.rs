/// Error types shared by every extension context
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: import files, empty fields, bad payloads
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// No receiving context, or the message channel closed before a reply
    #[error("Failed to communicate: {0}")]
    Transport(String),

    /// Non-success response from the GitHub API
    #[error("GitHub error: {0}")]
    Remote(String),

    /// Failure reported back by the background context
    #[error("{0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No text is highlighted")]
    NothingSelected,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn storage(context: &str, cause: impl std::fmt::Debug) -> Self {
        Error::Storage(format!("{}: {:?}", context, cause))
    }

    pub fn transport(context: &str, cause: impl std::fmt::Debug) -> Self {
        Error::Transport(format!("{}: {:?}", context, cause))
    }
}
