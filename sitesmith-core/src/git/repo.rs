//! Repository handle and read-only queries

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, Signature, Tree};

use crate::{Error, Result};

/// Identity used when neither the caller nor git config supplies one
const FALLBACK_NAME: &str = "sitesmith";
const FALLBACK_EMAIL: &str = "sitesmith@localhost";

/// Information about a git remote
#[derive(Debug, Clone)]
pub struct RemoteInfo {
    /// Name of the remote (e.g., "origin")
    pub name: String,
    /// URL of the remote
    pub url: String,
}

/// An open working tree
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the repository whose root is exactly `path`
    ///
    /// Unlike discovery this does not walk up to a parent repository, so a
    /// plain directory nested inside a checkout is rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::Config(format!("Not a git repository: {}", path.display()))
            } else {
                Error::Git(e)
            }
        })?;

        Self::from_repository(repo)
    }

    /// Wrap an already opened repository
    pub(crate) fn from_repository(repo: Repository) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the current branch name
    ///
    /// An unborn branch (fresh `git init`) still reports its name. Returns
    /// `None` for a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(|s| s.to_string())),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(|name| name.to_string()))
            }
            Err(e) => Err(Error::Other(format!("Failed to get HEAD: {}", e))),
        }
    }

    /// Tree of the HEAD commit, or `None` before the first commit
    pub fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_tree()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// `origin` when configured, otherwise the first remote with a URL
    pub fn default_remote(&self) -> Result<RemoteInfo> {
        let mut remotes = self.list_remotes()?;
        if remotes.is_empty() {
            return Err(Error::Config("No remotes configured".to_string()));
        }
        let pick = remotes.iter().position(|r| r.name == "origin").unwrap_or(0);
        Ok(remotes.swap_remove(pick))
    }

    /// Remotes that have a URL, in configuration order
    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let names = self.repo.remotes()?;
        let remotes = names
            .iter()
            .flatten()
            .filter_map(|name| {
                let remote = self.repo.find_remote(name).ok()?;
                Some(RemoteInfo {
                    name: name.to_string(),
                    url: remote.url()?.to_string(),
                })
            })
            .collect();
        Ok(remotes)
    }

    /// Signature for new commits
    ///
    /// An explicit name and email win; otherwise git config is used, and a
    /// built-in identity covers repositories with no `user.name` at all.
    pub fn signature(&self, name: Option<&str>, email: Option<&str>) -> Result<Signature<'static>> {
        if let (Some(name), Some(email)) = (name, email) {
            return Ok(Signature::now(name, email)?);
        }

        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(e) => {
                tracing::debug!("No git identity configured ({}), using fallback", e);
                Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?)
            }
        }
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{commit_file, init_repo};
    use tempfile::TempDir;

    #[test]
    fn test_open_non_git_dir() {
        let dir = TempDir::new().unwrap();
        assert!(GitRepo::open(dir.path()).is_err());
    }

    #[test]
    fn test_open_nested_dir_rejected() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();

        assert!(GitRepo::open(&nested).is_err());
    }

    #[test]
    fn test_unborn_branch_has_name() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());

        let repo = GitRepo::open(dir.path()).unwrap();
        assert_eq!(repo.current_branch().unwrap().as_deref(), Some("main"));
        assert!(repo.head_tree().unwrap().is_none());
    }

    #[test]
    fn test_detached_head_has_no_branch() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        let oid = commit_file(&raw, "a.txt", "a", "first");
        raw.set_head_detached(oid).unwrap();

        let repo = GitRepo::open(dir.path()).unwrap();
        assert_eq!(repo.current_branch().unwrap(), None);
    }

    #[test]
    fn test_default_remote_prefers_origin() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        raw.remote("upstream", "https://example.com/up.git").unwrap();
        raw.remote("origin", "https://example.com/origin.git").unwrap();

        let repo = GitRepo::open(dir.path()).unwrap();
        let remote = repo.default_remote().unwrap();
        assert_eq!(remote.name, "origin");
        assert_eq!(repo.list_remotes().unwrap().len(), 2);
    }

    #[test]
    fn test_default_remote_missing() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());

        let repo = GitRepo::open(dir.path()).unwrap();
        assert!(repo.default_remote().is_err());
    }

    #[test]
    fn test_explicit_signature() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());

        let repo = GitRepo::open(dir.path()).unwrap();
        let sig = repo
            .signature(Some("Test Author"), Some("author@example.com"))
            .unwrap();
        assert_eq!(sig.name(), Some("Test Author"));
        assert_eq!(sig.email(), Some("author@example.com"));
    }
}
