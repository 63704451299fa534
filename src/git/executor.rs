//! Write-side git operations: branch, commit, tag, push.
//!
//! All operations use `std::process::Command` to shell out to the system `git`
//! binary, inheriting the user's existing git config, SSH agent, and credential store.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Create and switch to a new branch.
pub fn create_branch(repo_dir: &Path, branch: &str) -> Result<(), GitError> {
    run_git(repo_dir, &["checkout", "-b", branch], "create branch")
}

/// Stage every change and commit it.
///
/// Returns `false` without committing when there is nothing to commit.
pub fn commit_all(repo_dir: &Path, message: &str) -> Result<bool, GitError> {
    run_git(repo_dir, &["add", "--all"], "stage files")?;

    let status = git_output(repo_dir, &["status", "--porcelain"], "status")?;
    if status.trim().is_empty() {
        debug!("Nothing to commit");
        return Ok(false);
    }

    run_git(repo_dir, &["commit", "-m", message], "create commit")?;
    Ok(true)
}

/// Create an annotated tag at HEAD.
pub fn create_tag(repo_dir: &Path, tag_name: &str, message: &str) -> Result<(), GitError> {
    run_git(repo_dir, &["tag", "-a", tag_name, "-m", message], "create tag")
}

/// Push a ref to a remote.
pub fn push(repo_dir: &Path, remote: &str, refspec: &str) -> Result<(), GitError> {
    run_git(repo_dir, &["push", remote, refspec], "push")
}

/// Run a git command and return success or a descriptive error.
fn run_git(repo_dir: &Path, args: &[&str], operation: &str) -> Result<(), GitError> {
    git_output(repo_dir, args, operation).map(|_| ())
}

fn git_output(repo_dir: &Path, args: &[&str], operation: &str) -> Result<String, GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()
        .map_err(|source| GitError::Spawn {
            operation: operation.to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed {
            operation: operation.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
