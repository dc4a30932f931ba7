//! Git operation commands

use std::path::PathBuf;

use clap::{Args, Subcommand};
use sitesmith_core::git::DEFAULT_REMOTE;
use sitesmith_core::tools::{
    BranchesArgs, CheckoutArgs, CloneArgs, CommitArgs, CreateBranchArgs, DiffArgs, HistoryArgs,
    PullArgs, PushArgs, RemoteArgs, StageArgs, StatusArgs,
};
use sitesmith_core::{ToolCall, Toolbox};

use super::print_record;

/// Git operation commands
#[derive(Args, Debug)]
pub struct GitArgs {
    #[command(subcommand)]
    pub command: GitCommand,
}

#[derive(Subcommand, Debug)]
pub enum GitCommand {
    /// Clone a repository and bind to it
    Clone {
        /// Repository URL (defaults to GIT_REPO_URL / config)
        url: Option<String>,

        /// Destination directory (defaults to the repository path)
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Branch to check out
        #[arg(short, long)]
        branch: Option<String>,

        /// Shallow clone depth
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Create a branch
    Branch {
        /// Branch name
        name: String,

        /// Create without checking it out
        #[arg(long)]
        no_checkout: bool,

        /// Revision to branch from (defaults to HEAD)
        #[arg(long)]
        start_point: Option<String>,
    },

    /// Check out a branch
    Checkout {
        /// Branch name
        name: String,

        /// Create the branch if it does not exist
        #[arg(short = 'b', long)]
        create: bool,
    },

    /// Stage files
    Stage {
        /// Paths to stage
        files: Vec<String>,

        /// Stage every change in the working tree
        #[arg(short = 'A', long)]
        all: bool,
    },

    /// Commit staged changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Author name (needs --author-email)
        #[arg(long)]
        author_name: Option<String>,

        /// Author email (needs --author-name)
        #[arg(long)]
        author_email: Option<String>,
    },

    /// Push a branch
    Push {
        /// Remote name
        #[arg(default_value = DEFAULT_REMOTE)]
        remote: String,

        /// Branch to push (defaults to the active branch)
        branch: Option<String>,

        /// Record the pushed branch as upstream
        #[arg(short = 'u', long)]
        set_upstream: bool,

        /// Force-update the remote branch
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch and integrate a branch
    Pull {
        /// Remote name
        #[arg(default_value = DEFAULT_REMOTE)]
        remote: String,

        /// Branch to pull (defaults to the upstream of the active branch)
        branch: Option<String>,
    },

    /// Show working tree status
    Status,

    /// List branches
    Branches {
        /// Include remote-tracking branches
        #[arg(short, long)]
        remote: bool,
    },

    /// Show commit history
    #[command(visible_alias = "history")]
    Log {
        /// Maximum number of commits
        #[arg(short = 'n', long, default_value_t = 10)]
        max_count: usize,

        /// Branch or revision to start from (defaults to HEAD)
        branch: Option<String>,
    },

    /// Add a remote
    RemoteAdd {
        /// Remote name
        name: String,

        /// Remote URL
        url: String,
    },

    /// Show a diff
    Diff {
        /// Compare the index with HEAD instead of the working tree with the index
        #[arg(long)]
        cached: bool,

        /// Limit the diff to one path
        path: Option<String>,
    },
}

impl From<GitCommand> for ToolCall {
    fn from(command: GitCommand) -> Self {
        match command {
            GitCommand::Clone {
                url,
                destination,
                branch,
                depth,
            } => ToolCall::CloneRepository(CloneArgs {
                url,
                destination,
                branch,
                depth,
            }),
            GitCommand::Branch {
                name,
                no_checkout,
                start_point,
            } => ToolCall::CreateBranch(CreateBranchArgs {
                branch_name: name,
                checkout: !no_checkout,
                start_point,
            }),
            GitCommand::Checkout { name, create } => ToolCall::CheckoutBranch(CheckoutArgs {
                branch_name: name,
                create_if_missing: create,
            }),
            GitCommand::Stage { files, all } => ToolCall::StageFiles(StageArgs {
                files,
                stage_all: all,
            }),
            GitCommand::Commit {
                message,
                author_name,
                author_email,
            } => ToolCall::Commit(CommitArgs {
                message,
                author_name,
                author_email,
            }),
            GitCommand::Push {
                remote,
                branch,
                set_upstream,
                force,
            } => ToolCall::Push(PushArgs {
                remote,
                branch,
                set_upstream,
                force,
            }),
            GitCommand::Pull { remote, branch } => ToolCall::Pull(PullArgs { remote, branch }),
            GitCommand::Status => ToolCall::GetStatus(StatusArgs {}),
            GitCommand::Branches { remote } => ToolCall::GetBranches(BranchesArgs {
                include_remote: remote,
            }),
            GitCommand::Log { max_count, branch } => {
                ToolCall::GetCommitHistory(HistoryArgs { max_count, branch })
            }
            GitCommand::RemoteAdd { name, url } => ToolCall::AddRemote(RemoteArgs { name, url }),
            GitCommand::Diff { cached, path } => ToolCall::GetDiff(DiffArgs { cached, path }),
        }
    }
}

impl GitArgs {
    /// Execute the git command, returning whether it succeeded
    pub fn execute(self, toolbox: &mut Toolbox) -> anyhow::Result<bool> {
        let record = toolbox.dispatch(self.command.into());
        print_record(&record)
    }
}
