//! Configuration display

use sitesmith_core::git::redact_url;
use sitesmith_core::{Config, Secrets};

/// Print the resolved configuration; the token itself is never shown
pub fn show(config: &Config, secrets: &Secrets, use_env: bool) {
    let has_token = use_env && secrets.github_token().is_some();

    println!("Sitesmith Configuration");
    println!("=======================");
    println!();
    println!("Git Settings:");
    println!(
        "  repo_path: {}",
        config
            .git
            .repo_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "  remote_url: {}",
        config
            .git
            .remote_url
            .as_deref()
            .map(redact_url)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  default_branch: {}", config.git.default_branch);
    println!("  token: {}", if has_token { "(set)" } else { "(not set)" });
    println!();
    println!("Output Settings:");
    println!("  dir: {}", config.output.dir.display());
    println!();

    if !use_env {
        println!("Config file and environment ignored (--no-env)");
        return;
    }
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
    if let Some(path) = Secrets::default_secrets_path() {
        println!("Secrets file: {}", path.display());
    }
}
