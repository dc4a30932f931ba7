//! Sitesmith Core - Git and file tools for content-generating agents
//!
//! This crate provides a repository facade that turns every git operation
//! into a uniform success/error record, plus the file writer and the
//! tool-call dispatcher that sits in front of both.

pub mod config;
pub mod error;
pub mod git;
pub mod secrets;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};
pub use git::{GitTool, GitToolConfig, ToolError, ToolResponse, ToolResult};
pub use secrets::Secrets;
pub use tools::{FileWriter, ToolCall, Toolbox};
