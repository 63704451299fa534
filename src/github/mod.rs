//! GitHub API operations using octocrab.

pub mod auth;
pub mod client;

pub use auth::get_github_token;
pub use client::{GitHubClient, OctocrabClient, parse_github_remote, parse_repo_slug};
