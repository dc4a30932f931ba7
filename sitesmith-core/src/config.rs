//! Configuration management for sitesmith
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (GIT_REPO_PATH, GIT_REPO_URL, GIT_DEFAULT_BRANCH)
//! 3. Config file (~/.config/sitesmith/config.toml)
//! 4. Default values
//!
//! The credential is not part of this file; see [`crate::secrets`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable holding the working tree path
pub const ENV_REPO_PATH: &str = "GIT_REPO_PATH";
/// Environment variable holding the fallback clone URL
pub const ENV_REPO_URL: &str = "GIT_REPO_URL";
/// Environment variable holding the default branch
pub const ENV_DEFAULT_BRANCH: &str = "GIT_DEFAULT_BRANCH";

/// Branch used when nothing else is configured
pub const DEFAULT_BRANCH: &str = "main";

/// Repository-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitSettings {
    /// Working tree the tools operate on
    pub repo_path: Option<PathBuf>,

    /// Clone source used when a clone call names no URL
    pub remote_url: Option<String>,

    /// Branch checked out by clone when none is requested
    pub default_branch: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            repo_path: None,
            remote_url: None,
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

/// Settings for the file writer tool
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory generated files are written into
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Repository configuration
    pub git: GitSettings,

    /// File writer configuration
    pub output: OutputSettings,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/sitesmith/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sitesmith").join("config.toml"))
    }

    /// Apply environment variable overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using an arbitrary lookup
    ///
    /// Empty values are treated as unset.
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var(ENV_REPO_PATH) {
            self.git.repo_path = Some(PathBuf::from(path));
        }

        if let Some(url) = var(ENV_REPO_URL) {
            self.git.remote_url = Some(url);
        }

        if let Some(branch) = var(ENV_DEFAULT_BRANCH) {
            self.git.default_branch = branch;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, repo_path: Option<PathBuf>) -> Self {
        if let Some(path) = repo_path {
            self.git.repo_path = Some(path);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. With `use_env` unset
    /// only the CLI flags and defaults apply.
    pub fn load_with_overrides(repo_path: Option<PathBuf>, use_env: bool) -> Result<Self> {
        let base = if use_env {
            Self::load()?.with_env_overrides()
        } else {
            Self::default()
        };

        Ok(base.with_cli_overrides(repo_path))
    }
}
