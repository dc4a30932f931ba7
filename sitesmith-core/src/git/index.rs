//! Staging area and working tree status

use std::path::{Component, Path, PathBuf};

use git2::{IndexAddOption, Status, StatusOptions};

use super::report::StatusReport;
use super::repo::GitRepo;
use crate::{Error, Result};

impl GitRepo {
    /// Stage every new, modified and deleted path (`git add -A`)
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.inner().index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    /// Stage exactly the given paths
    ///
    /// Paths are relative to the repository root; absolute paths inside the
    /// working tree are accepted too. A path that is gone from the working
    /// tree but still tracked stages its deletion.
    pub fn stage_paths<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        let mut index = self.inner().index()?;

        for path in paths {
            let normalized = self.repo_relative(Path::new(path.as_ref()));
            let relative = normalized.as_path();
            let on_disk = self.root().join(relative);

            if on_disk.is_dir() {
                let spec = if relative.as_os_str().is_empty() {
                    Path::new("*")
                } else {
                    relative
                };
                index.add_all([spec].iter(), IndexAddOption::DEFAULT, None)?;
            } else if on_disk.exists() {
                index.add_path(relative)?;
            } else if index.get_path(relative, 0).is_some() {
                index.remove_path(relative)?;
            } else {
                return Err(Error::Other(format!(
                    "pathspec '{}' did not match any files",
                    relative.display()
                )));
            }
        }

        index.write()?;
        Ok(())
    }

    /// `path` relative to the working tree root, without `.` components
    fn repo_relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.root())
            .unwrap_or(path)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }

    /// Paths whose index entry differs from HEAD
    pub fn staged_paths(&self) -> Result<Vec<String>> {
        let repo = self.inner();
        let index = repo.index()?;
        let head_tree = self.head_tree()?;

        let diff = repo.diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        let paths = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|p| p.to_string_lossy().into_owned())
            .collect();

        Ok(paths)
    }

    /// Classify every changed path in the working tree
    pub fn status(&self) -> Result<StatusReport> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .inner()
            .statuses(Some(&mut opts))
            .map_err(|e| Error::Other(format!("Failed to read status: {}", e)))?;

        let mut report = StatusReport {
            current_branch: self.current_branch()?,
            ..StatusReport::default()
        };

        let worktree_changed = Status::WT_MODIFIED
            | Status::WT_DELETED
            | Status::WT_TYPECHANGE
            | Status::WT_RENAMED;
        let index_changed = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE;

        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let status = entry.status();

            if status.contains(Status::WT_NEW) {
                report.untracked_files.push(path.to_string());
            }
            if status.intersects(worktree_changed) {
                report.modified_files.push(path.to_string());
            }
            if status.intersects(index_changed) {
                report.staged_files.push(path.to_string());
            }
        }

        report.is_dirty = !report.untracked_files.is_empty()
            || !report.modified_files.is_empty()
            || !report.staged_files.is_empty();

        Ok(report)
    }
}
