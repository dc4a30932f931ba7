//! Failure taxonomy for tool calls

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result of a single tool call
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// A failed tool call
///
/// Wrapped messages are the underlying library's text, unmodified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Required input absent and no configured fallback
    #[error("No {0} provided and no default configured")]
    MissingParameter(&'static str),

    /// Path exists but is not a repository root
    #[error("{} is not a valid Git repository", .0.display())]
    InvalidRepository(PathBuf),

    /// Operation needs a bound repository and none could be opened
    #[error("No repository loaded")]
    NoRepositoryLoaded,

    #[error("Failed to clone repository: {0}")]
    CloneFailed(String),

    #[error("Branch operation failed: {0}")]
    BranchOperationFailed(String),

    #[error("Branch '{0}' does not exist")]
    BranchNotFound(String),

    #[error("No files specified and stage_all is false")]
    NoFilesSpecified,

    #[error("Failed to stage files: {0}")]
    StageFailed(String),

    #[error("Failed to commit: {0}")]
    CommitFailed(String),

    /// The remote refused a ref update, or the push itself failed
    #[error("Push failed: {0}")]
    PushRejected(String),

    #[error("Failed to pull: {0}")]
    PullFailed(String),

    #[error("Remote operation failed: {0}")]
    RemoteOperationFailed(String),

    #[error("Failed to get status: {0}")]
    StatusFailed(String),

    #[error("Failed to get commit history: {0}")]
    HistoryFailed(String),

    #[error("Failed to get diff: {0}")]
    DiffFailed(String),

    #[error("Failed to write file: {0}")]
    WriteFailed(String),

    /// A dispatched call could not be decoded
    #[error("Invalid tool call: {0}")]
    InvalidToolCall(String),
}

/// Machine-readable discriminant of a [`ToolError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    MissingParameter,
    InvalidRepository,
    NoRepositoryLoaded,
    CloneFailed,
    BranchOperationFailed,
    BranchNotFound,
    NoFilesSpecified,
    StageFailed,
    CommitFailed,
    PushRejected,
    PullFailed,
    RemoteOperationFailed,
    StatusFailed,
    HistoryFailed,
    DiffFailed,
    WriteFailed,
    InvalidToolCall,
}

impl ToolError {
    /// The discriminant reported alongside the message
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::MissingParameter(_) => ErrorKind::MissingParameter,
            ToolError::InvalidRepository(_) => ErrorKind::InvalidRepository,
            ToolError::NoRepositoryLoaded => ErrorKind::NoRepositoryLoaded,
            ToolError::CloneFailed(_) => ErrorKind::CloneFailed,
            ToolError::BranchOperationFailed(_) => ErrorKind::BranchOperationFailed,
            ToolError::BranchNotFound(_) => ErrorKind::BranchNotFound,
            ToolError::NoFilesSpecified => ErrorKind::NoFilesSpecified,
            ToolError::StageFailed(_) => ErrorKind::StageFailed,
            ToolError::CommitFailed(_) => ErrorKind::CommitFailed,
            ToolError::PushRejected(_) => ErrorKind::PushRejected,
            ToolError::PullFailed(_) => ErrorKind::PullFailed,
            ToolError::RemoteOperationFailed(_) => ErrorKind::RemoteOperationFailed,
            ToolError::StatusFailed(_) => ErrorKind::StatusFailed,
            ToolError::HistoryFailed(_) => ErrorKind::HistoryFailed,
            ToolError::DiffFailed(_) => ErrorKind::DiffFailed,
            ToolError::WriteFailed(_) => ErrorKind::WriteFailed,
            ToolError::InvalidToolCall(_) => ErrorKind::InvalidToolCall,
        }
    }
}
