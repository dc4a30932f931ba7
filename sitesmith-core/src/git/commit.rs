//! Commit creation and history

use chrono::{DateTime, FixedOffset};
use git2::{Commit, Oid, Signature, Sort, Time};

use super::report::CommitEntry;
use super::repo::GitRepo;
use crate::{Error, Result};

/// Length of an abbreviated commit id
pub const SHORT_SHA_LEN: usize = 7;

/// Author in `Name <email>` form
pub fn format_signature(sig: &Signature<'_>) -> String {
    format!(
        "{} <{}>",
        sig.name().unwrap_or("Unknown"),
        sig.email().unwrap_or("")
    )
}

/// ISO-8601 timestamp in the signature's own offset
pub fn iso_time(time: Time) -> String {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)
        .or_else(|| FixedOffset::east_opt(0));
    match (DateTime::from_timestamp(time.seconds(), 0), offset) {
        (Some(utc), Some(offset)) => utc.with_timezone(&offset).to_rfc3339(),
        _ => time.seconds().to_string(),
    }
}

/// First seven hex digits of an id
pub fn short_sha(oid: &Oid) -> String {
    oid.to_string()[..SHORT_SHA_LEN].to_string()
}

impl CommitEntry {
    /// Summarise a commit for history listings
    pub fn from_commit(commit: &Commit<'_>) -> Self {
        let sha = commit.id().to_string();
        Self {
            short_sha: short_sha(&commit.id()),
            sha,
            message: commit.message().unwrap_or("").trim().to_string(),
            author: format_signature(&commit.author()),
            date: iso_time(commit.committer().when()),
        }
    }
}

impl GitRepo {
    /// Commit the index onto HEAD
    ///
    /// Fails when the index has nothing new relative to HEAD.
    pub fn commit_index(
        &self,
        message: &str,
        author_name: Option<&str>,
        author_email: Option<&str>,
    ) -> Result<Oid> {
        let repo = self.inner();

        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let parent = match self.head_tree()? {
            Some(_) => Some(repo.head()?.peel_to_commit()?),
            None => None,
        };

        let unchanged = match parent {
            Some(ref parent) => parent.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            return Err(Error::Other("nothing to commit, no changes staged".to_string()));
        }

        let author = self.signature(author_name, author_email)?;
        let committer = self.signature(None, None)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = repo.commit(Some("HEAD"), &author, &committer, message, &tree, &parents)?;
        Ok(oid)
    }

    /// Walk ancestry from `branch` (or HEAD), newest first, at most `max_count`
    pub fn history(&self, max_count: usize, branch: Option<&str>) -> Result<Vec<CommitEntry>> {
        let repo = self.inner();
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        match branch {
            Some(spec) => {
                let start = repo
                    .revparse_single(spec)
                    .and_then(|obj| obj.peel_to_commit())
                    .map_err(|e| Error::Other(format!("Unknown revision '{}': {}", spec, e)))?;
                revwalk.push(start.id())?;
            }
            None => revwalk.push_head()?,
        }

        revwalk
            .take(max_count)
            .map(|oid| -> Result<CommitEntry> {
                let commit = repo.find_commit(oid?)?;
                Ok(CommitEntry::from_commit(&commit))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::{commit_file, init_repo, write_file};
    use tempfile::TempDir;

    #[test]
    fn test_iso_time_keeps_offset() {
        assert_eq!(iso_time(Time::new(0, 0)), "1970-01-01T00:00:00+00:00");
        assert_eq!(iso_time(Time::new(0, 120)), "1970-01-01T02:00:00+02:00");
    }

    #[test]
    fn test_commit_index() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        write_file(&raw, "a.txt", "a");

        let repo = GitRepo::open(dir.path()).unwrap();
        repo.stage_paths(&["a.txt"]).unwrap();
        let oid = repo
            .commit_index("first", Some("Test Author"), Some("author@example.com"))
            .unwrap();

        let commit = raw.find_commit(oid).unwrap();
        assert_eq!(commit.message(), Some("first"));
        assert_eq!(format_signature(&commit.author()), "Test Author <author@example.com>");
        assert_eq!(commit.committer().name(), Some("Test User"));
        assert_eq!(commit.parent_count(), 0);
    }

    #[test]
    fn test_commit_without_changes_fails() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        commit_file(&raw, "a.txt", "a", "first");

        let repo = GitRepo::open(dir.path()).unwrap();
        assert!(repo.commit_index("again", None, None).is_err());
    }

    #[test]
    fn test_commit_on_empty_repo_fails() {
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());

        let repo = GitRepo::open(dir.path()).unwrap();
        assert!(repo.commit_index("empty", None, None).is_err());
    }

    #[test]
    fn test_history_order_and_cap() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        for i in 1..=5 {
            commit_file(&raw, "log.txt", &format!("{}", i), &format!("commit {}\n", i));
        }

        let repo = GitRepo::open(dir.path()).unwrap();
        let capped = repo.history(3, None).unwrap();
        let messages: Vec<_> = capped.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["commit 5", "commit 4", "commit 3"]);

        let all = repo.history(10, None).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[4].message, "commit 1");
        for entry in &all {
            assert_eq!(entry.sha.len(), 40);
            assert_eq!(entry.short_sha, entry.sha[..7]);
        }
    }

    #[test]
    fn test_history_from_branch() {
        let dir = TempDir::new().unwrap();
        let raw = init_repo(dir.path());
        commit_file(&raw, "a.txt", "1", "one");
        let repo = GitRepo::open(dir.path()).unwrap();
        repo.create_branch("old", None).unwrap();
        commit_file(&raw, "a.txt", "2", "two");

        let old = repo.history(10, Some("old")).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].message, "one");
        assert!(repo.history(10, Some("nope")).is_err());
    }
}
