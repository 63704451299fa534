//! GitHub authentication detection.
//!
//! Tokens are looked up in this order:
//! 1. `GITHUB_TOKEN` environment variable
//! 2. `GH_TOKEN` environment variable
//! 3. `gh auth token` from the gh CLI

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Get a GitHub token from the environment or the gh CLI.
pub fn get_github_token() -> Result<String, GitHubError> {
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = env::var(var)
            && !token.trim().is_empty()
        {
            debug!(source = var, "Using GitHub token from environment");
            return Ok(token.trim().to_string());
        }
    }

    if let Some(token) = get_token_from_gh_cli() {
        debug!("Using GitHub token from gh CLI");
        return Ok(token);
    }

    Err(GitHubError::AuthenticationFailed)
}

fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
