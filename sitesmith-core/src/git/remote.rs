//! Clone, remotes, push and pull

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AnnotatedCommit, FetchOptions, PushOptions};

use super::auth::{remote_callbacks, Credential};
use super::report::PullOutcome;
use super::repo::GitRepo;
use crate::{Error, Result};

impl GitRepo {
    /// Clone `url` into `destination`
    ///
    /// `url` must already carry whatever credential it needs; `credential`
    /// only answers the transport's authentication callbacks.
    pub fn clone_from(
        url: &str,
        destination: &Path,
        branch: Option<&str>,
        depth: Option<u32>,
        credential: Option<&Credential>,
    ) -> Result<Self> {
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credential));
        if let Some(depth) = depth {
            let depth = i32::try_from(depth)
                .map_err(|_| Error::Other(format!("Clone depth {} is too large", depth)))?;
            fetch_options.depth(depth);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        if let Some(branch) = branch {
            builder.branch(branch);
        }

        let repo = builder.clone(url, destination)?;
        Self::from_repository(repo)
    }

    /// Register a new remote
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.inner().remote(name, url)?;
        Ok(())
    }

    /// URL configured for a remote
    pub fn remote_url(&self, name: &str) -> Result<String> {
        let remote = self
            .inner()
            .find_remote(name)
            .map_err(|e| Error::Config(format!("Remote '{}' not found: {}", name, e)))?;
        remote
            .url()
            .map(|u| u.to_string())
            .ok_or_else(|| Error::Config(format!("Remote '{}' has no URL", name)))
    }

    /// Persist a new URL for a remote
    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<()> {
        self.inner().remote_set_url(name, url)?;
        Ok(())
    }

    /// Push a local branch to the same name on `remote`
    ///
    /// The transport can succeed while the remote refuses the ref update;
    /// such per-ref rejections are returned as errors too.
    pub fn push_branch(
        &self,
        remote_name: &str,
        branch: &str,
        force: bool,
        credential: Option<&Credential>,
    ) -> Result<()> {
        let mut remote = self
            .inner()
            .find_remote(remote_name)
            .map_err(|e| Error::Config(format!("Remote '{}' not found: {}", remote_name, e)))?;

        let refspec = format!(
            "{}refs/heads/{}:refs/heads/{}",
            if force { "+" } else { "" },
            branch,
            branch
        );

        let mut rejected: Vec<String> = Vec::new();
        let pushed = {
            let mut callbacks = remote_callbacks(credential);
            callbacks.push_update_reference(|refname, status| {
                if let Some(status) = status {
                    rejected.push(format!("{} ({})", refname, status));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut push_options))
        };
        pushed?;

        if !rejected.is_empty() {
            return Err(Error::Other(format!("remote rejected {}", rejected.join(", "))));
        }

        Ok(())
    }

    /// Record `remote/branch` as the upstream of a local branch
    pub fn set_upstream(&self, remote_name: &str, branch: &str) -> Result<()> {
        let mut config = self.inner().config()?;
        config.set_str(&format!("branch.{}.remote", branch), remote_name)?;
        config.set_str(
            &format!("branch.{}.merge", branch),
            &format!("refs/heads/{}", branch),
        )?;
        Ok(())
    }

    /// Upstream branch name configured for a local branch, if any
    pub fn upstream_branch(&self, branch: &str) -> Option<String> {
        let config = self.inner().config().ok()?;
        let merge = config.get_string(&format!("branch.{}.merge", branch)).ok()?;
        Some(merge.strip_prefix("refs/heads/").unwrap_or(&merge).to_string())
    }

    /// Fetch `branch` from `remote` and integrate it into the current branch
    pub fn pull_branch(
        &self,
        remote_name: &str,
        branch: &str,
        credential: Option<&Credential>,
    ) -> Result<PullOutcome> {
        let repo = self.inner();

        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|e| Error::Config(format!("Remote '{}' not found: {}", remote_name, e)))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credential));
        remote.fetch(&[branch], Some(&mut fetch_options), None)?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let incoming = repo.reference_to_annotated_commit(&fetch_head)?;
        self.integrate(&incoming, &format!("{}/{}", remote_name, branch))
    }

    fn integrate(&self, incoming: &AnnotatedCommit<'_>, source: &str) -> Result<PullOutcome> {
        let repo = self.inner();
        let (analysis, _) = repo.merge_analysis(&[incoming])?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::UpToDate);
        }

        let local = self
            .current_branch()?
            .ok_or_else(|| Error::Other("HEAD is detached; check out a branch first".to_string()))?;
        let refname = format!("refs/heads/{}", local);
        let target = repo.find_commit(incoming.id())?;

        if analysis.is_unborn() {
            repo.reference(&refname, incoming.id(), true, &format!("pull: from {}", source))?;
            repo.set_head(&refname)?;
            repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;
            return Ok(PullOutcome::FastForward);
        }

        if analysis.is_fast_forward() {
            repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))?;
            let mut reference = repo.find_reference(&refname)?;
            reference.set_target(incoming.id(), &format!("pull: fast-forward from {}", source))?;
            repo.set_head(&refname)?;
            return Ok(PullOutcome::FastForward);
        }

        repo.merge(&[incoming], None, None)?;

        let mut index = repo.index()?;
        if index.has_conflicts() {
            let mut conflicted = Vec::new();
            for conflict in index.conflicts()? {
                let conflict = conflict?;
                if let Some(entry) = conflict.our.or(conflict.their) {
                    conflicted.push(String::from_utf8_lossy(&entry.path).into_owned());
                }
            }
            return Err(Error::Other(format!(
                "merge conflicts in: {}; resolve them and commit",
                conflicted.join(", ")
            )));
        }

        let tree = repo.find_tree(index.write_tree_to(repo)?)?;
        let head = repo.head()?.peel_to_commit()?;
        let sig = self.signature(None, None)?;
        let message = format!("Merge {} into {}", source, local);
        repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&head, &target])?;
        repo.cleanup_state()?;

        Ok(PullOutcome::Merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{commit_file, init_bare, init_repo, write_file};
    use tempfile::TempDir;

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_clone_local_branch() {
        let src = TempDir::new().unwrap();
        let raw = init_repo(src.path());
        commit_file(&raw, "test.txt", "test", "Initial commit");
        GitRepo::open(src.path())
            .unwrap()
            .create_branch("feature", None)
            .unwrap();

        let dest = TempDir::new().unwrap();
        let target = dest.path().join("cloned");
        let cloned =
            GitRepo::clone_from(&path_str(src.path()), &target, Some("feature"), None, None)
                .unwrap();

        assert_eq!(cloned.current_branch().unwrap().as_deref(), Some("feature"));
        assert!(target.join("test.txt").exists());
    }

    #[test]
    fn test_clone_missing_branch_fails() {
        let src = TempDir::new().unwrap();
        let raw = init_repo(src.path());
        commit_file(&raw, "test.txt", "test", "Initial commit");

        let dest = TempDir::new().unwrap();
        let result = GitRepo::clone_from(
            &path_str(src.path()),
            &dest.path().join("cloned"),
            Some("does-not-exist"),
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_remote_and_duplicate() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());

        let repo = GitRepo::open(dir.path()).unwrap();
        repo.add_remote("origin", "https://github.com/test/repo.git")
            .unwrap();
        assert_eq!(
            repo.remote_url("origin").unwrap(),
            "https://github.com/test/repo.git"
        );
        assert!(repo.add_remote("origin", "https://example.com/x.git").is_err());
    }

    #[test]
    fn test_push_to_bare_and_set_upstream() {
        let bare = TempDir::new().unwrap();
        let bare_repo = init_bare(bare.path());

        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        let tip = commit_file(&raw, "a.txt", "a", "first");

        let repo = GitRepo::open(dir.path()).unwrap();
        repo.add_remote("origin", &path_str(bare.path())).unwrap();
        repo.push_branch("origin", "main", false, None).unwrap();
        repo.set_upstream("origin", "main").unwrap();

        let remote_tip = bare_repo
            .find_reference("refs/heads/main")
            .unwrap()
            .target()
            .unwrap();
        assert_eq!(remote_tip, tip);
        assert_eq!(repo.upstream_branch("main").as_deref(), Some("main"));
    }

    #[test]
    fn test_push_unknown_remote_fails() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        commit_file(&raw, "a.txt", "a", "first");

        let repo = GitRepo::open(dir.path()).unwrap();
        let err = repo.push_branch("nowhere", "main", false, None).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_pull_fast_forward_and_up_to_date() {
        let bare = TempDir::new().unwrap();
        init_bare(bare.path());

        // Writer publishes two commits, reader starts from the first
        let writer_dir = TempDir::new().unwrap();
        let writer_raw = init_repo(writer_dir.path());
        commit_file(&writer_raw, "a.txt", "1", "one");
        let writer = GitRepo::open(writer_dir.path()).unwrap();
        writer.add_remote("origin", &path_str(bare.path())).unwrap();
        writer.push_branch("origin", "main", false, None).unwrap();

        let reader_dir = TempDir::new().unwrap();
        let reader_path = reader_dir.path().join("reader");
        let reader =
            GitRepo::clone_from(&path_str(bare.path()), &reader_path, Some("main"), None, None)
                .unwrap();

        let second = commit_file(&writer_raw, "a.txt", "2", "two");
        writer.push_branch("origin", "main", false, None).unwrap();

        let outcome = reader.pull_branch("origin", "main", None).unwrap();
        assert_eq!(outcome, PullOutcome::FastForward);
        assert_eq!(reader.inner().head().unwrap().target().unwrap(), second);
        assert_eq!(std::fs::read_to_string(reader_path.join("a.txt")).unwrap(), "2");

        let again = reader.pull_branch("origin", "main", None).unwrap();
        assert_eq!(again, PullOutcome::UpToDate);
    }

    #[test]
    fn test_pull_creates_merge_commit() {
        let bare = TempDir::new().unwrap();
        init_bare(bare.path());

        let writer_dir = TempDir::new().unwrap();
        let writer_raw = init_repo(writer_dir.path());
        commit_file(&writer_raw, "shared.txt", "base", "base");
        let writer = GitRepo::open(writer_dir.path()).unwrap();
        writer.add_remote("origin", &path_str(bare.path())).unwrap();
        writer.push_branch("origin", "main", false, None).unwrap();

        let reader_dir = TempDir::new().unwrap();
        let reader_path = reader_dir.path().join("reader");
        let reader =
            GitRepo::clone_from(&path_str(bare.path()), &reader_path, Some("main"), None, None)
                .unwrap();
        let reader_raw = reader.inner();
        {
            let mut config = reader_raw.config().unwrap();
            config.set_str("user.name", "Reader").unwrap();
            config.set_str("user.email", "reader@example.com").unwrap();
        }

        commit_file(&writer_raw, "upstream.txt", "up", "upstream change");
        writer.push_branch("origin", "main", false, None).unwrap();
        commit_file(reader_raw, "local.txt", "local", "local change");
        write_file(reader_raw, "notes.txt", "untracked stays");

        let outcome = reader.pull_branch("origin", "main", None).unwrap();
        assert_eq!(outcome, PullOutcome::Merged);

        let head = reader_raw.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 2);
        assert!(reader_path.join("upstream.txt").exists());
        assert!(reader_path.join("local.txt").exists());
        assert!(reader_path.join("notes.txt").exists());
    }
}
