//! Textual diffs

use git2::{Diff, DiffFormat, DiffOptions};

use super::repo::GitRepo;
use crate::Result;

impl GitRepo {
    /// Patch text for staged (`cached`) or unstaged changes
    ///
    /// `cached` compares the index with HEAD, otherwise the working tree is
    /// compared with the index. Untracked files are not part of either.
    pub fn diff_text(&self, cached: bool, path: Option<&str>) -> Result<String> {
        let repo = self.inner();

        let mut opts = DiffOptions::new();
        if let Some(path) = path {
            opts.pathspec(path);
        }

        let diff = if cached {
            let head_tree = self.head_tree()?;
            repo.diff_tree_to_index(head_tree.as_ref(), None, Some(&mut opts))?
        } else {
            repo.diff_index_to_workdir(None, Some(&mut opts))?
        };

        render_patch(&diff)
    }
}

fn render_patch(diff: &Diff<'_>) -> Result<String> {
    let mut out = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if matches!(line.origin(), '+' | '-' | ' ') {
            out.push(line.origin());
        }
        out.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(out)
}
