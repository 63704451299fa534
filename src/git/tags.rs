//! Tag lookup.

use git2::{ErrorCode, Oid, Repository};

use crate::error::GitError;

/// Find the commit a tag points at, handling both lightweight and annotated
/// tags. Returns `None` when the tag does not exist.
pub fn find_tag(repo: &Repository, name: &str) -> Result<Option<Oid>, GitError> {
    let refname = format!("refs/tags/{}", name);
    let reference = match repo.find_reference(&refname) {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(GitError::ReferenceNotFound(refname, e)),
    };

    let commit = reference.peel_to_commit().map_err(GitError::ParseCommit)?;
    Ok(Some(commit.id()))
}

/// Whether a tag with this exact name exists.
pub fn tag_exists(repo: &Repository, name: &str) -> Result<bool, GitError> {
    Ok(find_tag(repo, name)?.is_some())
}
