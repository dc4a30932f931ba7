//! Error types for sitesmith

use thiserror::Error;

/// Result type alias for sitesmith operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for configuration, secrets and repository plumbing
///
/// Facade operations convert these into [`crate::git::ToolError`] at their
/// boundary; nothing of this type escapes a tool call.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by libgit2
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
