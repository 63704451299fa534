//! Commit range resolution.

use git2::{Oid, Repository};
use tracing::debug;

use crate::error::GitError;

use super::tags::find_tag;

/// Resolved commit range. A missing `from` means "all history".
#[derive(Debug, Clone)]
pub struct CommitRange {
    pub from: Option<Oid>,
    pub to: Oid,
    pub from_ref: String,
}

/// Resolve the commits to consider for a release.
///
/// Starts after `since_tag` when that tag exists, otherwise covers all
/// history up to HEAD.
pub fn resolve_release_range(
    repo: &Repository,
    since_tag: Option<&str>,
) -> Result<CommitRange, GitError> {
    let to = resolve_reference(repo, "HEAD")?;

    let from = match since_tag {
        Some(tag) => find_tag(repo, tag)?.map(|oid| (oid, tag.to_string())),
        None => None,
    };

    match from {
        Some((oid, name)) => Ok(CommitRange {
            from: Some(oid),
            to,
            from_ref: name,
        }),
        None => {
            debug!(tag = ?since_tag, "No release tag found, using full history");
            Ok(CommitRange {
                from: None,
                to,
                from_ref: "root".to_string(),
            })
        }
    }
}

/// Resolve a reference (tag, branch, commit hash) to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference)
        && repo.find_commit(oid).is_ok()
    {
        return Ok(oid);
    }

    let obj = repo
        .revparse_single(reference)
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
    Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id())
}
