//! librarian - configure, version and release generated Google API client
//! libraries.
//!
//! # Overview
//!
//! librarian parses conventional commit messages (including nested and
//! override blocks) into per-library change records, merges a declarative
//! YAML configuration with its defaults, and plans semver releases with
//! changelogs and tags for every library that changed.

pub mod changelog;
pub mod config;
pub mod conventional;
pub mod error;
pub mod fetch;
pub mod generate;
pub mod git;
pub mod github;
pub mod logging;
pub mod release;
pub mod version;

// Re-export commonly used types
pub use config::{Config, Library, LibraryDefaults};
pub use conventional::{ConventionalCommit, RawCommit, parse_commit};
pub use error::{
    ChangelogError, ConfigError, FetchError, GenerateError, GitError, GitHubError, ParseError,
    ReleaseError, VersionError,
};
pub use release::{LibraryRelease, ReleasePlan};
pub use version::BumpType;
