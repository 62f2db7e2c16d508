use std::io;

/// Errors that can occur while turning a module descriptor into a build command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed module: {0}")]
    MalformedModule(#[source] serde_json::Error),

    #[error("malformed recipe: {0}")]
    MalformedRecipe(#[source] serde_json::Error),

    #[error("No sources specified")]
    NoSourcesSpecified,

    #[error("{0}")]
    SourceFetchFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for vib-cargo operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps any collaborator failure so its message survives verbatim
    pub fn fetch_failed(err: impl std::fmt::Display) -> Self {
        Error::SourceFetchFailed(err.to_string())
    }
}
