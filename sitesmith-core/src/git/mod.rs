//! Git operations for sitesmith
//!
//! This module wraps a single working tree behind [`GitTool`], whose every
//! operation reports a [`ToolResult`] that renders as a [`ToolResponse`].

mod auth;
mod branch;
mod commit;
mod diff;
mod error;
mod index;
mod remote;
mod repo;
mod report;
mod tool;

#[cfg(test)]
mod testing;

pub use auth::{redact_url, rewrite_with_credential, Credential};
pub use commit::SHORT_SHA_LEN;
pub use error::{ErrorKind, ToolError, ToolResult};
pub use repo::{GitRepo, RemoteInfo};
pub use report::{
    BranchListReport, BranchReport, CheckoutReport, CloneReport, CommitEntry, CommitReport,
    DiffReport, HistoryReport, PullOutcome, PullReport, PushReport, RemoteReport, StageReport,
    StatusReport, ToolResponse, WriteReport,
};
pub use tool::{GitTool, GitToolConfig, DEFAULT_REMOTE};
