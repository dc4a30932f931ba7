//! Tool calls as agents issue them
//!
//! A call is a JSON object naming the tool and its arguments:
//!
//! ```json
//! {"tool": "create_branch", "args": {"branch_name": "feature/x", "checkout": true}}
//! ```
//!
//! [`Toolbox::dispatch`] runs the call against the bound repository or the
//! output directory and returns the uniform response record.

mod file_writer;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::git::{GitTool, ToolError, ToolResponse, ToolResult, DEFAULT_REMOTE};

pub use file_writer::{FileWriter, DEFAULT_EXTENSION};

fn default_true() -> bool {
    true
}

fn default_remote() -> String {
    DEFAULT_REMOTE.to_string()
}

fn default_max_count() -> usize {
    10
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneArgs {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub destination: Option<PathBuf>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub depth: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBranchArgs {
    pub branch_name: String,
    #[serde(default = "default_true")]
    pub checkout: bool,
    #[serde(default)]
    pub start_point: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutArgs {
    pub branch_name: String,
    #[serde(default)]
    pub create_if_missing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageArgs {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub stage_all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitArgs {
    pub message: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushArgs {
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub set_upstream: bool,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullArgs {
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusArgs {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchesArgs {
    #[serde(default)]
    pub include_remote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryArgs {
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArgs {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffArgs {
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteArgs {
    pub content: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// One tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum ToolCall {
    CloneRepository(CloneArgs),
    CreateBranch(CreateBranchArgs),
    CheckoutBranch(CheckoutArgs),
    StageFiles(StageArgs),
    Commit(CommitArgs),
    Push(PushArgs),
    Pull(PullArgs),
    GetStatus(StatusArgs),
    GetBranches(BranchesArgs),
    GetCommitHistory(HistoryArgs),
    AddRemote(RemoteArgs),
    GetDiff(DiffArgs),
    WriteToFile(WriteArgs),
}

impl ToolCall {
    /// Name the call is dispatched under
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::CloneRepository(_) => "clone_repository",
            ToolCall::CreateBranch(_) => "create_branch",
            ToolCall::CheckoutBranch(_) => "checkout_branch",
            ToolCall::StageFiles(_) => "stage_files",
            ToolCall::Commit(_) => "commit",
            ToolCall::Push(_) => "push",
            ToolCall::Pull(_) => "pull",
            ToolCall::GetStatus(_) => "get_status",
            ToolCall::GetBranches(_) => "get_branches",
            ToolCall::GetCommitHistory(_) => "get_commit_history",
            ToolCall::AddRemote(_) => "add_remote",
            ToolCall::GetDiff(_) => "get_diff",
            ToolCall::WriteToFile(_) => "write_to_file",
        }
    }

    /// Decode a call, treating a missing `args` object as empty
    pub fn from_json(input: &str) -> ToolResult<Self> {
        let invalid = |e: serde_json::Error| ToolError::InvalidToolCall(e.to_string());

        let mut value: serde_json::Value = serde_json::from_str(input).map_err(invalid)?;
        if let Some(object) = value.as_object_mut() {
            object
                .entry("args")
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
        }
        serde_json::from_value(value).map_err(invalid)
    }
}

fn respond<T: Serialize>(result: ToolResult<T>) -> serde_json::Value {
    ToolResponse::from(result).to_json()
}

/// Every tool an agent can call, sharing one repository binding
#[derive(Debug)]
pub struct Toolbox {
    git: GitTool,
    writer: FileWriter,
}

impl Toolbox {
    pub fn new(git: GitTool, writer: FileWriter) -> Self {
        Self { git, writer }
    }

    pub fn git(&self) -> &GitTool {
        &self.git
    }

    pub fn git_mut(&mut self) -> &mut GitTool {
        &mut self.git
    }

    pub fn writer(&self) -> &FileWriter {
        &self.writer
    }

    /// Run a call and render its response record
    pub fn dispatch(&mut self, call: ToolCall) -> serde_json::Value {
        debug!(tool = call.name(), "Dispatching tool call");
        let git = &mut self.git;

        match call {
            ToolCall::CloneRepository(args) => respond(git.clone_repository(
                args.url.as_deref(),
                args.destination.as_deref(),
                args.branch.as_deref(),
                args.depth,
            )),
            ToolCall::CreateBranch(args) => respond(git.create_branch(
                &args.branch_name,
                args.checkout,
                args.start_point.as_deref(),
            )),
            ToolCall::CheckoutBranch(args) => {
                respond(git.checkout_branch(&args.branch_name, args.create_if_missing))
            }
            ToolCall::StageFiles(args) => respond(git.stage_files(&args.files, args.stage_all)),
            ToolCall::Commit(args) => respond(git.commit(
                &args.message,
                args.author_name.as_deref(),
                args.author_email.as_deref(),
            )),
            ToolCall::Push(args) => respond(git.push(
                &args.remote,
                args.branch.as_deref(),
                args.set_upstream,
                args.force,
            )),
            ToolCall::Pull(args) => respond(git.pull(&args.remote, args.branch.as_deref())),
            ToolCall::GetStatus(StatusArgs {}) => respond(git.get_status()),
            ToolCall::GetBranches(args) => respond(git.get_branches(args.include_remote)),
            ToolCall::GetCommitHistory(args) => {
                respond(git.get_commit_history(args.max_count, args.branch.as_deref()))
            }
            ToolCall::AddRemote(args) => respond(git.add_remote(&args.name, &args.url)),
            ToolCall::GetDiff(args) => respond(git.get_diff(args.cached, args.path.as_deref())),
            ToolCall::WriteToFile(args) => respond(self.writer.write(
                &args.content,
                args.filename.as_deref(),
                &args.extension,
            )),
        }
    }

    /// Decode and run a call given as JSON text
    ///
    /// Undecodable input yields an `InvalidToolCall` record instead of an error.
    pub fn dispatch_json(&mut self, input: &str) -> serde_json::Value {
        match ToolCall::from_json(input) {
            Ok(call) => self.dispatch(call),
            Err(e) => respond::<()>(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitToolConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn toolbox(repo_path: Option<PathBuf>, output: PathBuf) -> Toolbox {
        let git = GitTool::new(GitToolConfig {
            repo_path,
            ..GitToolConfig::default()
        })
        .unwrap();
        Toolbox::new(git, FileWriter::new(output))
    }

    fn init_repo(path: &std::path::Path) {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = git2::Repository::init_opts(path, &opts).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    #[test]
    fn test_parse_with_defaults() {
        let call = ToolCall::from_json(r#"{"tool": "create_branch", "args": {"branch_name": "x"}}"#)
            .unwrap();
        assert_eq!(
            call,
            ToolCall::CreateBranch(CreateBranchArgs {
                branch_name: "x".into(),
                checkout: true,
                start_point: None,
            })
        );

        let call = ToolCall::from_json(r#"{"tool": "get_commit_history"}"#).unwrap();
        assert_eq!(
            call,
            ToolCall::GetCommitHistory(HistoryArgs {
                max_count: 10,
                branch: None,
            })
        );

        let call = ToolCall::from_json(r#"{"tool": "push", "args": {}}"#).unwrap();
        match call {
            ToolCall::Push(args) => {
                assert_eq!(args.remote, "origin");
                assert!(!args.set_upstream);
                assert!(!args.force);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        for input in [
            "not json",
            r#"{"tool": "rm_rf"}"#,
            r#"{"tool": "commit", "args": {}}"#,
        ] {
            let err = ToolCall::from_json(input).unwrap_err();
            assert_eq!(err.kind(), crate::git::ErrorKind::InvalidToolCall, "{}", input);
        }
    }

    #[test]
    fn test_invalid_call_record() {
        let out = TempDir::new().unwrap();
        let mut tools = toolbox(None, out.path().to_path_buf());

        let record = tools.dispatch_json(r#"{"tool": "nope"}"#);
        assert_eq!(record["success"], json!(false));
        assert_eq!(record["kind"], json!("InvalidToolCall"));
    }

    #[test]
    fn test_unbound_record() {
        let out = TempDir::new().unwrap();
        let mut tools = toolbox(None, out.path().to_path_buf());

        let record = tools.dispatch(ToolCall::GetStatus(StatusArgs {}));
        assert_eq!(
            record,
            json!({
                "success": false,
                "error": "No repository loaded",
                "kind": "NoRepositoryLoaded"
            })
        );
    }

    #[test]
    fn test_session_over_one_binding() {
        let repo = TempDir::new().unwrap();
        init_repo(repo.path());
        let out = TempDir::new().unwrap();
        let mut tools = toolbox(Some(repo.path().to_path_buf()), out.path().join("output"));

        let written = tools.dispatch_json(concat!(
            r#"{"tool": "write_to_file", "args": "#,
            r#"{"content": "<h1>hi</h1>", "filename": "index", "extension": "html"}}"#,
        ));
        assert_eq!(written["success"], json!(true));
        std::fs::copy(
            out.path().join("output").join("index.html"),
            repo.path().join("index.html"),
        )
        .unwrap();

        let staged = tools.dispatch_json(r#"{"tool": "stage_files", "args": {"stage_all": true}}"#);
        assert_eq!(staged["staged_files"], json!(["index.html"]));

        let committed = tools
            .dispatch_json(r#"{"tool": "commit", "args": {"message": "Add landing page"}}"#);
        assert_eq!(committed["success"], json!(true));
        assert_eq!(committed["commit_message"], json!("Add landing page"));

        let history = tools.dispatch_json(r#"{"tool": "get_commit_history"}"#);
        assert_eq!(history["count"], json!(1));
        assert_eq!(history["commits"][0]["message"], json!("Add landing page"));

        let status = tools.dispatch_json(r#"{"tool": "get_status"}"#);
        assert_eq!(status["is_dirty"], json!(false));
        assert_eq!(status["current_branch"], json!("main"));
    }

    #[test]
    fn test_call_names_round_trip() {
        let call = ToolCall::GetDiff(DiffArgs::default());
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["tool"], json!(call.name()));
    }
}
