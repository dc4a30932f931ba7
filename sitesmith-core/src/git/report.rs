//! Success payloads and the uniform response record

use std::path::PathBuf;

use serde::Serialize;

use super::error::{ErrorKind, ToolResult};

/// Result of a clone
#[derive(Debug, Clone, Serialize)]
pub struct CloneReport {
    pub message: String,
    pub repo_path: PathBuf,
    pub current_branch: Option<String>,
    pub using_token: bool,
}

/// Result of creating a branch
#[derive(Debug, Clone, Serialize)]
pub struct BranchReport {
    pub message: String,
    pub branch_name: String,
    pub checked_out: bool,
    /// Active branch after the call, whether or not it changed
    pub current_branch: Option<String>,
}

/// Result of checking out a branch
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReport {
    pub message: String,
    pub current_branch: Option<String>,
}

/// Result of staging
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub message: String,
    pub staged_files: Vec<String>,
}

/// Result of a commit
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub message: String,
    pub commit_sha: String,
    pub short_sha: String,
    pub commit_message: String,
    pub author: String,
    pub committed_date: String,
}

/// Result of a push
#[derive(Debug, Clone, Serialize)]
pub struct PushReport {
    pub message: String,
    pub remote: String,
    pub branch: String,
    pub using_token: bool,
}

/// How a pull integrated the fetched commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PullOutcome {
    /// Nothing new upstream
    UpToDate,
    /// Local branch moved forward to the fetched commit
    FastForward,
    /// A merge commit was created
    Merged,
}

/// Result of a pull
#[derive(Debug, Clone, Serialize)]
pub struct PullReport {
    pub message: String,
    pub remote: String,
    pub branch: String,
    pub outcome: PullOutcome,
    pub using_token: bool,
}

/// Working tree status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub current_branch: Option<String>,
    pub untracked_files: Vec<String>,
    pub modified_files: Vec<String>,
    pub staged_files: Vec<String>,
    pub is_dirty: bool,
}

/// Branch listing
#[derive(Debug, Clone, Serialize)]
pub struct BranchListReport {
    pub current_branch: Option<String>,
    pub local_branches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_branches: Option<Vec<String>>,
}

/// One commit in a history listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitEntry {
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    pub author: String,
    pub date: String,
}

/// Commit history, newest first
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub commits: Vec<CommitEntry>,
    pub count: usize,
}

/// Result of adding a remote
#[derive(Debug, Clone, Serialize)]
pub struct RemoteReport {
    pub message: String,
    pub name: String,
    pub url: String,
}

/// Diff text; empty when there is nothing to show
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub diff: String,
}

/// Result of writing a generated file
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub message: String,
    pub file: PathBuf,
}

/// The uniform record every tool call is reported as
///
/// ```json
/// {"success": false, "error": "No repository loaded", "kind": "NoRepositoryLoaded"}
/// {"success": true, "message": "...", "current_branch": "main", ...}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> From<ToolResult<T>> for ToolResponse<T> {
    fn from(result: ToolResult<T>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                error: None,
                kind: None,
                data: Some(data),
            },
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
                kind: Some(err.kind()),
                data: None,
            },
        }
    }
}

impl<T: Serialize> ToolResponse<T> {
    /// Render the record as a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({
                "success": false,
                "error": format!("Failed to serialize response: {}", e),
            })
        })
    }
}
