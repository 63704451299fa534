//! Commit history traversal.

use chrono::{TimeZone, Utc};
use git2::{Commit, DiffOptions, Oid, Repository};

use crate::conventional::RawCommit;
use crate::error::GitError;

impl RawCommit {
    /// Create a RawCommit from a git2 Commit.
    pub fn from_git2_commit(commit: &Commit) -> Self {
        let time = commit.time();
        let when = Utc
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            message: commit.message().unwrap_or("").to_string(),
            hash: commit.id().to_string(),
            when,
        }
    }
}

/// Fetch commits reachable from `to` but not from `from`, newest first.
///
/// When `paths` is non-empty only commits that change a file below one of
/// those paths are returned.
pub fn fetch_commits(
    repo: &Repository,
    from: Option<Oid>,
    to: Oid,
    paths: &[String],
) -> Result<Vec<RawCommit>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push(to).map_err(GitError::RevwalkError)?;
    if let Some(from) = from {
        revwalk.hide(from).map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        if paths.is_empty() || touches_paths(repo, &commit, paths)? {
            commits.push(RawCommit::from_git2_commit(&commit));
        }
    }

    Ok(commits)
}

/// Whether a commit changes any file below `paths`, compared to its first
/// parent (or the empty tree for a root commit).
pub fn touches_paths(repo: &Repository, commit: &Commit, paths: &[String]) -> Result<bool, GitError> {
    let diff_err = |source: git2::Error| GitError::Diff {
        hash: commit.id().to_string(),
        source,
    };

    let tree = commit.tree().map_err(diff_err)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(diff_err)?),
        Err(_) => None,
    };

    let mut opts = DiffOptions::new();
    for path in paths {
        opts.pathspec(path.trim_end_matches('/'));
    }

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
        .map_err(diff_err)?;
    Ok(diff.deltas().len() > 0)
}
