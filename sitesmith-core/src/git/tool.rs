//! The repository facade handed to agents
//!
//! [`GitTool`] owns at most one open working tree. It is either unbound or
//! bound to a path; only construction against an existing repository and
//! [`GitTool::clone_repository`] bind it. Every other operation first makes
//! one attempt to reopen the last known path, then fails with
//! [`ToolError::NoRepositoryLoaded`].
//!
//! Operations never panic or propagate library errors: each returns a
//! [`ToolResult`] whose error variant names the failure category and carries
//! the underlying message.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::auth::{redact_url, rewrite_with_credential, Credential};
use super::commit::{format_signature, iso_time, short_sha};
use super::error::{ToolError, ToolResult};
use super::report::{
    BranchListReport, BranchReport, CheckoutReport, CloneReport, CommitReport, DiffReport,
    HistoryReport, PullReport, PushReport, RemoteReport, StageReport, StatusReport,
};
use super::repo::GitRepo;
use crate::config::{Config, DEFAULT_BRANCH};
use crate::secrets::Secrets;

/// Remote used by push and pull when none is named
pub const DEFAULT_REMOTE: &str = "origin";

/// Mask the credential in messages that are reported back to callers
fn scrub(message: String, credential: Option<&Credential>) -> String {
    match credential {
        Some(credential) if !credential.expose().is_empty() => {
            message.replace(credential.expose(), "***")
        }
        _ => message,
    }
}

/// Everything the facade needs from its host process
#[derive(Debug, Clone)]
pub struct GitToolConfig {
    /// Working tree to bind to, and the clone destination fallback
    pub repo_path: Option<PathBuf>,
    /// Token inserted into GitHub URLs before network operations
    pub credential: Option<Credential>,
    /// Clone source fallback
    pub default_remote_url: Option<String>,
    /// Branch checked out by clone when none is requested
    pub default_branch: String,
}

impl Default for GitToolConfig {
    fn default() -> Self {
        Self {
            repo_path: None,
            credential: None,
            default_remote_url: None,
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl GitToolConfig {
    /// Build from loaded configuration and secrets
    pub fn from_sources(config: &Config, secrets: &Secrets) -> Self {
        Self {
            repo_path: config.git.repo_path.clone(),
            credential: secrets.github_token(),
            default_remote_url: config.git.remote_url.clone(),
            default_branch: config.git.default_branch.clone(),
        }
    }

    /// Explicit arguments win over whatever was configured
    pub fn with_overrides(
        mut self,
        repo_path: Option<PathBuf>,
        credential: Option<Credential>,
    ) -> Self {
        if repo_path.is_some() {
            self.repo_path = repo_path;
        }
        if credential.is_some() {
            self.credential = credential;
        }
        self
    }
}

/// Git operations facade
#[derive(Debug)]
pub struct GitTool {
    config: GitToolConfig,
    repo: Option<GitRepo>,
}

impl GitTool {
    /// Create the facade, binding immediately if the configured path exists
    ///
    /// An existing path that is not a repository root is rejected; a missing
    /// path is fine, since a later clone will create it.
    pub fn new(config: GitToolConfig) -> ToolResult<Self> {
        let repo = match config.repo_path.as_deref() {
            Some(path) if path.exists() => Some(
                GitRepo::open(path)
                    .map_err(|_| ToolError::InvalidRepository(path.to_path_buf()))?,
            ),
            _ => None,
        };

        if let Some(ref repo) = repo {
            debug!(path = %repo.root().display(), "Bound repository");
        }

        Ok(Self { config, repo })
    }

    /// The facade's configuration
    pub fn config(&self) -> &GitToolConfig {
        &self.config
    }

    /// Path of the bound working tree
    pub fn path(&self) -> Option<&Path> {
        if self.repo.is_some() {
            self.config.repo_path.as_deref()
        } else {
            None
        }
    }

    /// Whether a repository is currently bound
    pub fn is_bound(&self) -> bool {
        self.repo.is_some()
    }

    /// Rewrite `url` to carry the configured credential
    pub fn rewrite_with_credential(&self, url: &str) -> String {
        rewrite_with_credential(url, self.config.credential.as_ref())
    }

    fn using_token(&self) -> bool {
        self.config.credential.is_some()
    }

    /// One attempt to (re)open the last known path
    fn ensure_bound(&mut self) -> bool {
        if self.repo.is_some() {
            return true;
        }

        let Some(path) = self.config.repo_path.as_deref() else {
            return false;
        };
        if !path.exists() {
            return false;
        }

        match GitRepo::open(path) {
            Ok(repo) => {
                debug!(path = %path.display(), "Reopened repository");
                self.repo = Some(repo);
                true
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not reopen repository");
                false
            }
        }
    }

    fn bound(&mut self) -> ToolResult<&GitRepo> {
        if !self.ensure_bound() {
            return Err(ToolError::NoRepositoryLoaded);
        }
        self.repo.as_ref().ok_or(ToolError::NoRepositoryLoaded)
    }

    /// Clone a repository and bind to it
    ///
    /// `url` and `destination` fall back to the configured remote URL and
    /// repository path. The branch falls back to the configured default. On
    /// failure the current binding is left as it was.
    pub fn clone_repository(
        &mut self,
        url: Option<&str>,
        destination: Option<&Path>,
        branch: Option<&str>,
        depth: Option<u32>,
    ) -> ToolResult<CloneReport> {
        let url = url
            .map(str::to_string)
            .or_else(|| self.config.default_remote_url.clone())
            .ok_or(ToolError::MissingParameter("url"))?;
        let destination = destination
            .map(Path::to_path_buf)
            .or_else(|| self.config.repo_path.clone())
            .ok_or(ToolError::MissingParameter("destination"))?;
        let branch = branch
            .map(str::to_string)
            .or_else(|| Some(self.config.default_branch.clone()).filter(|b| !b.is_empty()));

        let authenticated = self.rewrite_with_credential(&url);
        let result = GitRepo::clone_from(
            &authenticated,
            &destination,
            branch.as_deref(),
            depth,
            self.config.credential.as_ref(),
        );

        let repo = match result {
            Ok(repo) => repo,
            Err(e) => {
                warn!(url = %redact_url(&authenticated), error = %e, "Clone failed");
                return Err(ToolError::CloneFailed(scrub(
                    e.to_string(),
                    self.config.credential.as_ref(),
                )));
            }
        };

        let current_branch = repo.current_branch().ok().flatten();
        info!(
            url = %redact_url(&authenticated),
            path = %destination.display(),
            branch = ?current_branch,
            "Cloned repository"
        );

        self.repo = Some(repo);
        self.config.repo_path = Some(destination.clone());

        Ok(CloneReport {
            message: format!("Successfully cloned repository to {}", destination.display()),
            repo_path: destination,
            current_branch,
            using_token: self.using_token(),
        })
    }

    /// Create a branch from `start_point` (or HEAD), optionally checking it out
    pub fn create_branch(
        &mut self,
        name: &str,
        checkout: bool,
        start_point: Option<&str>,
    ) -> ToolResult<BranchReport> {
        let repo = self.bound()?;
        let failed = |e: crate::Error| ToolError::BranchOperationFailed(e.to_string());

        repo.create_branch(name, start_point).map_err(failed)?;
        if checkout {
            repo.checkout_branch(name).map_err(failed)?;
        }
        let current_branch = repo.current_branch().map_err(failed)?;

        info!(branch = name, checkout, "Created branch");
        Ok(BranchReport {
            message: format!("Created branch '{}'", name),
            branch_name: name.to_string(),
            checked_out: checkout,
            current_branch,
        })
    }

    /// Check out a branch, creating it first if asked to
    pub fn checkout_branch(
        &mut self,
        name: &str,
        create_if_missing: bool,
    ) -> ToolResult<CheckoutReport> {
        if !self.bound()?.branch_exists(name) {
            if !create_if_missing {
                return Err(ToolError::BranchNotFound(name.to_string()));
            }
            let created = self.create_branch(name, true, None)?;
            return Ok(CheckoutReport {
                message: created.message,
                current_branch: created.current_branch,
            });
        }

        let repo = self.bound()?;
        let failed = |e: crate::Error| ToolError::BranchOperationFailed(e.to_string());
        repo.checkout_branch(name).map_err(failed)?;
        let current_branch = repo.current_branch().map_err(failed)?;

        info!(branch = name, "Checked out branch");
        Ok(CheckoutReport {
            message: format!("Checked out branch '{}'", name),
            current_branch,
        })
    }

    /// Stage everything, or exactly the given paths
    pub fn stage_files(&mut self, paths: &[String], stage_all: bool) -> ToolResult<StageReport> {
        let repo = self.bound()?;
        let failed = |e: crate::Error| ToolError::StageFailed(e.to_string());

        if stage_all {
            repo.stage_all().map_err(failed)?;
            let staged_files = repo.staged_paths().map_err(failed)?;
            info!(count = staged_files.len(), "Staged all files");
            return Ok(StageReport {
                message: "Staged all files".to_string(),
                staged_files,
            });
        }

        if paths.is_empty() {
            return Err(ToolError::NoFilesSpecified);
        }

        repo.stage_paths(paths).map_err(failed)?;
        info!(count = paths.len(), "Staged files");
        Ok(StageReport {
            message: format!("Staged {} file(s)", paths.len()),
            staged_files: paths.to_vec(),
        })
    }

    /// Commit the staged changes
    ///
    /// The author is `author_name <author_email>` when both are given,
    /// otherwise whatever git config says.
    pub fn commit(
        &mut self,
        message: &str,
        author_name: Option<&str>,
        author_email: Option<&str>,
    ) -> ToolResult<CommitReport> {
        let repo = self.bound()?;
        if message.trim().is_empty() {
            return Err(ToolError::MissingParameter("message"));
        }

        let failed = |e: crate::Error| ToolError::CommitFailed(e.to_string());
        let (name, email) = match (author_name, author_email) {
            (Some(name), Some(email)) => (Some(name), Some(email)),
            _ => (None, None),
        };

        let oid = repo.commit_index(message, name, email).map_err(failed)?;
        let commit = repo
            .inner()
            .find_commit(oid)
            .map_err(|e| ToolError::CommitFailed(e.to_string()))?;

        let author = format_signature(&commit.author());
        let committed_date = iso_time(commit.committer().when());

        info!(sha = %oid, "Created commit");
        Ok(CommitReport {
            message: "Commit created successfully".to_string(),
            commit_sha: oid.to_string(),
            short_sha: short_sha(&oid),
            commit_message: message.to_string(),
            author,
            committed_date,
        })
    }

    /// Replace a remote's stored URL with its authenticated form
    fn authenticate_remote(
        repo: &GitRepo,
        remote: &str,
        credential: Option<&Credential>,
    ) -> crate::Result<()> {
        if credential.is_none() {
            return Ok(());
        }
        let original = repo.remote_url(remote)?;
        let authenticated = rewrite_with_credential(&original, credential);
        if authenticated != original {
            debug!(remote, url = %redact_url(&authenticated), "Rewrote remote URL with credential");
            repo.set_remote_url(remote, &authenticated)?;
        }
        Ok(())
    }

    /// Push a branch (default: the active one) to `remote`
    pub fn push(
        &mut self,
        remote: &str,
        branch: Option<&str>,
        set_upstream: bool,
        force: bool,
    ) -> ToolResult<PushReport> {
        let credential = self.config.credential.clone();
        let using_token = self.using_token();
        let repo = self.bound()?;
        let rejected =
            |e: crate::Error| ToolError::PushRejected(scrub(e.to_string(), credential.as_ref()));

        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => repo.current_branch().map_err(rejected)?.ok_or_else(|| {
                ToolError::PushRejected("HEAD is detached; name the branch to push".to_string())
            })?,
        };

        Self::authenticate_remote(repo, remote, credential.as_ref()).map_err(rejected)?;

        if let Err(e) = repo.push_branch(remote, &branch, force, credential.as_ref()) {
            warn!(remote, branch = %branch, error = %e, "Push failed");
            return Err(rejected(e));
        }
        if set_upstream {
            repo.set_upstream(remote, &branch).map_err(rejected)?;
        }

        info!(remote, branch = %branch, force, "Pushed branch");
        Ok(PushReport {
            message: format!("Pushed to {}/{}", remote, branch),
            remote: remote.to_string(),
            branch,
            using_token,
        })
    }

    /// Fetch and integrate `branch` (default: the tracked upstream) from `remote`
    pub fn pull(&mut self, remote: &str, branch: Option<&str>) -> ToolResult<PullReport> {
        let credential = self.config.credential.clone();
        let using_token = self.using_token();
        let repo = self.bound()?;
        let failed =
            |e: crate::Error| ToolError::PullFailed(scrub(e.to_string(), credential.as_ref()));

        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => {
                let current = repo.current_branch().map_err(failed)?.ok_or_else(|| {
                    ToolError::PullFailed("HEAD is detached; name the branch to pull".to_string())
                })?;
                repo.upstream_branch(&current).unwrap_or(current)
            }
        };

        Self::authenticate_remote(repo, remote, credential.as_ref()).map_err(failed)?;

        let outcome = match repo.pull_branch(remote, &branch, credential.as_ref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(remote, branch = %branch, error = %e, "Pull failed");
                return Err(failed(e));
            }
        };

        info!(remote, branch = %branch, ?outcome, "Pulled");
        Ok(PullReport {
            message: format!("Pulled from {}", remote),
            remote: remote.to_string(),
            branch,
            outcome,
            using_token,
        })
    }

    /// Branch, untracked, modified and staged paths
    pub fn get_status(&mut self) -> ToolResult<StatusReport> {
        let repo = self.bound()?;
        repo.status().map_err(|e| ToolError::StatusFailed(e.to_string()))
    }

    /// Local branches, plus remote-tracking branches on request
    ///
    /// Remote branches are read from the default remote; with no remote
    /// configured that is an error rather than an empty list.
    pub fn get_branches(&mut self, include_remote: bool) -> ToolResult<BranchListReport> {
        let repo = self.bound()?;
        let failed = |e: crate::Error| ToolError::BranchOperationFailed(e.to_string());

        let current_branch = repo.current_branch().map_err(failed)?;
        let local_branches = repo.list_local_branches().map_err(failed)?;

        let remote_branches = if include_remote {
            let remote = repo.default_remote().map_err(failed)?;
            Some(repo.list_remote_branches(Some(&remote.name)).map_err(failed)?)
        } else {
            None
        };

        Ok(BranchListReport {
            current_branch,
            local_branches,
            remote_branches,
        })
    }

    /// Up to `max_count` commits, newest first, from `branch` or HEAD
    pub fn get_commit_history(
        &mut self,
        max_count: usize,
        branch: Option<&str>,
    ) -> ToolResult<HistoryReport> {
        let repo = self.bound()?;
        let commits = repo
            .history(max_count, branch)
            .map_err(|e| ToolError::HistoryFailed(e.to_string()))?;

        Ok(HistoryReport {
            count: commits.len(),
            commits,
        })
    }

    /// Add a named remote
    pub fn add_remote(&mut self, name: &str, url: &str) -> ToolResult<RemoteReport> {
        let repo = self.bound()?;
        repo.add_remote(name, url)
            .map_err(|e| ToolError::RemoteOperationFailed(e.to_string()))?;

        info!(remote = name, url = %redact_url(url), "Added remote");
        Ok(RemoteReport {
            message: format!("Added remote '{}' with URL '{}'", name, redact_url(url)),
            name: name.to_string(),
            url: redact_url(url),
        })
    }

    /// Staged (`cached`) or unstaged diff, optionally for one path
    pub fn get_diff(&mut self, cached: bool, path: Option<&str>) -> ToolResult<DiffReport> {
        let repo = self.bound()?;
        let diff = repo
            .diff_text(cached, path)
            .map_err(|e| ToolError::DiffFailed(e.to_string()))?;
        Ok(DiffReport { diff })
    }
}
