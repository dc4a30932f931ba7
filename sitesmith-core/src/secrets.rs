//! Token storage
//!
//! The GitHub token lives in `~/.config/sitesmith/secrets.toml`, apart from
//! the regular configuration, and that file must be private to its owner
//! (mode 0600 on Unix). `GITHUB_TOKEN` in the environment wins over the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::git::Credential;
use crate::{Error, Result};

/// Environment variable holding the GitHub token
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

const TEMPLATE: &str = r#"# sitesmith secrets - keep this file private (chmod 600)

[github]
# Personal access token for clone/push/pull over HTTPS.
# Needs repository contents read/write.
token = ""
"#;

/// Contents of the secrets file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub github: GitHubSecrets,
}

/// The `[github]` table
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    pub token: Option<String>,
}

impl std::fmt::Debug for GitHubSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSecrets")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Refuse files that group or others can read
#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "{} is accessible to other users (mode {:o}); run `chmod 600 {}`",
            path.display(),
            mode,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}

impl Secrets {
    /// Secrets from the default location, or empty ones if there is no file
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse a secrets file after checking its permissions
    pub fn load_from_file(path: &Path) -> Result<Self> {
        ensure_private(path)?;

        let raw = fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&raw).map_err(|e| {
            Error::Config(format!("Invalid secrets file {}: {}", path.display(), e))
        })?;
        secrets.github.token = secrets
            .github
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        debug!(
            path = %path.display(),
            has_token = secrets.github.token.is_some(),
            "Loaded secrets"
        );
        Ok(secrets)
    }

    /// `~/.config/sitesmith/secrets.toml`
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sitesmith").join("secrets.toml"))
    }

    /// The token to authenticate with, if any
    pub fn github_token(&self) -> Option<Credential> {
        self.github_token_with(|key| std::env::var(key).ok())
    }

    /// [`Secrets::github_token`] against an arbitrary environment
    pub fn github_token_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Credential> {
        let from_env = lookup(ENV_GITHUB_TOKEN)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(token) = from_env {
            debug!("Using token from {}", ENV_GITHUB_TOKEN);
            return Some(Credential::new(token));
        }

        self.github
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(Credential::new)
    }

    /// Write an empty, owner-only secrets file at `path`
    ///
    /// An existing file is left alone and reported as an error.
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(Error::Config(format!(
                "{} already exists; edit it instead",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, TEMPLATE)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        warn!(path = %path.display(), "Wrote secrets template; add your token to it");
        Ok(())
    }

    /// [`Secrets::write_template`] at the default location
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("No config directory on this platform".to_string()))?;
        Self::write_template(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_token(token: &str) -> Secrets {
        Secrets {
            github: GitHubSecrets {
                token: Some(token.to_string()),
            },
        }
    }

    #[test]
    fn test_empty_secrets_have_no_token() {
        assert!(Secrets::default().github_token_with(|_| None).is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", with_token("ghp_secret"));
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_environment_wins() {
        let secrets = with_token("from_file");

        let token = secrets
            .github_token_with(|key| (key == ENV_GITHUB_TOKEN).then(|| "from_env".to_string()))
            .unwrap();
        assert_eq!(token.expose(), "from_env");

        let blank_env = secrets.github_token_with(|_| Some("   ".to_string())).unwrap();
        assert_eq!(blank_env.expose(), "from_file");
    }

    #[test]
    fn test_template_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("secrets.toml");

        Secrets::write_template(&path).unwrap();
        let secrets = Secrets::load_from_file(&path).unwrap();
        assert!(secrets.github.token.is_none());

        let again = Secrets::write_template(&path).unwrap_err();
        assert!(again.to_string().contains("already exists"));
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_enforced() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        fs::write(&path, "[github]\ntoken = \"  ghp_test  \"\n").unwrap();

        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let err = Secrets::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("chmod 600"));

        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let secrets = Secrets::load_from_file(&path).unwrap();
        assert_eq!(secrets.github.token.as_deref(), Some("ghp_test"));
    }
}
