//! Git operations using git2-rs and the git CLI.

pub mod commits;
pub mod executor;
pub mod range;
pub mod tags;

pub use commits::{fetch_commits, touches_paths};
pub use executor::{commit_all, create_branch, create_tag, push};
pub use range::{CommitRange, resolve_reference, resolve_release_range};
pub use tags::{find_tag, tag_exists};
