//! Branch creation, checkout and listing

use git2::build::CheckoutBuilder;
use git2::BranchType;

use super::repo::GitRepo;
use crate::{Error, Result};

impl GitRepo {
    /// Create a local branch at `start_point` (any revspec), or at HEAD
    pub fn create_branch(&self, name: &str, start_point: Option<&str>) -> Result<()> {
        let repo = self.inner();

        let target = match start_point {
            Some(spec) => repo
                .revparse_single(spec)
                .and_then(|obj| obj.peel_to_commit())
                .map_err(|e| Error::Other(format!("Invalid start point '{}': {}", spec, e)))?,
            None => repo
                .head()
                .and_then(|head| head.peel_to_commit())
                .map_err(|e| Error::Other(format!("Failed to resolve HEAD: {}", e)))?,
        };

        repo.branch(name, &target, false)?;
        Ok(())
    }

    /// Check out an existing local branch
    ///
    /// Uses a safe checkout: local modifications that would be overwritten
    /// abort the switch instead of being discarded.
    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        let repo = self.inner();

        let branch = repo.find_branch(name, BranchType::Local)?;
        let refname = branch
            .get()
            .name()
            .ok_or_else(|| Error::Other(format!("Branch '{}' has a non UTF-8 name", name)))?
            .to_string();
        let commit = branch.get().peel_to_commit()?;

        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
        repo.set_head(&refname)?;
        Ok(())
    }

    /// Whether a local branch with this name exists
    pub fn branch_exists(&self, name: &str) -> bool {
        self.inner().find_branch(name, BranchType::Local).is_ok()
    }

    /// List all local branches
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        let mut branches = Vec::new();

        for branch in self
            .inner()
            .branches(Some(BranchType::Local))
            .map_err(|e| Error::Other(format!("Failed to list branches: {}", e)))?
        {
            let (branch, _) =
                branch.map_err(|e| Error::Other(format!("Failed to read branch: {}", e)))?;
            if let Some(name) = branch.name().ok().flatten() {
                branches.push(name.to_string());
            }
        }

        Ok(branches)
    }

    /// List remote tracking branches, optionally restricted to one remote
    pub fn list_remote_branches(&self, remote: Option<&str>) -> Result<Vec<String>> {
        let mut branches = Vec::new();
        let filter_prefix = remote.map(|r| format!("{}/", r));

        for branch in self
            .inner()
            .branches(Some(BranchType::Remote))
            .map_err(|e| Error::Other(format!("Failed to list branches: {}", e)))?
        {
            let (branch, _) =
                branch.map_err(|e| Error::Other(format!("Failed to read branch: {}", e)))?;
            if let Some(name) = branch.name().ok().flatten() {
                match filter_prefix {
                    Some(ref prefix) if !name.starts_with(prefix) => {}
                    _ => branches.push(name.to_string()),
                }
            }
        }

        Ok(branches)
    }
}
