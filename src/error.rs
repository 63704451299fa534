//! Error types for librarian modules using thiserror.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from conventional commit parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("commit message is empty")]
    EmptyCommitMessage,

    #[error("commit part is empty after marker extraction")]
    EmptyCommitPart,
}

/// A single uniqueness violation found while validating libraries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateLibraryName(String),
    DuplicateChannelPath { path: String, library: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLibraryName(name) => write!(f, "duplicate library name: {}", name),
            Self::DuplicateChannelPath { path, library } => {
                write!(f, "duplicate channel path: {} (in library {})", path, library)
            }
        }
    }
}

/// Errors from configuration loading, saving and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("invalid libraries: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

impl ConfigError {
    /// Whether this error reports at least one duplicate library name.
    pub fn has_duplicate_library_name(&self) -> bool {
        self.issues()
            .iter()
            .any(|i| matches!(i, ValidationIssue::DuplicateLibraryName(_)))
    }

    /// Whether this error reports at least one duplicate channel path.
    pub fn has_duplicate_channel_path(&self) -> bool {
        self.issues()
            .iter()
            .any(|i| matches!(i, ValidationIssue::DuplicateChannelPath { .. }))
    }

    /// The validation issues carried by this error, if any.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation(issues) => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to diff commit {hash}: {source}")]
    Diff {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("Failed to run git {operation}: {source}")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("GitHub API request failed: {0}")]
    Api(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API. Resets at: {reset_time}")]
    RateLimited { reset_time: String },

    #[error("Repository not found: {owner}/{repo}")]
    RepositoryNotFound { owner: String, repo: String },

    #[error("Failed to parse repository URL")]
    InvalidRepositoryUrl,
}

/// Errors from changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to parse changelog: {0}")]
    ParseFailed(String),
}

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("Failed to update {path}: {reason}")]
    ManifestUpdate { path: PathBuf, reason: String },
}

/// Errors from source archive fetching.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Download cancelled")]
    Cancelled,

    #[error("All {attempts} download attempts failed: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Source {0} is not configured")]
    MissingSource(String),

    #[error("Source {0} has neither a commit nor a local directory")]
    UnpinnedSource(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the generation driver.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Generator '{0}' not found in PATH")]
    GeneratorNotFound(String),

    #[error("Failed to spawn generator: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Generator exited with code {code:?} for library {library}")]
    NonZeroExit { library: String, code: Option<i32> },

    #[error("Failed to clean {path}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Errors from release planning and publishing.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Configuration has no 'repo' entry; cannot reach GitHub")]
    MissingRepo,

    #[error("Release cancelled by user")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ConfigError::Validation(vec![
            ValidationIssue::DuplicateLibraryName("a".into()),
            ValidationIssue::DuplicateChannelPath {
                path: "google/x/v1".into(),
                library: "b".into(),
            },
        ]);
        let message = err.to_string();
        assert!(message.contains("duplicate library name: a"));
        assert!(message.contains("duplicate channel path: google/x/v1"));
        assert!(err.has_duplicate_library_name());
        assert!(err.has_duplicate_channel_path());
    }

    #[test]
    fn test_non_validation_error_has_no_issues() {
        let err = ConfigError::Serialize(
            serde_yaml::from_str::<u32>("not a number").unwrap_err(),
        );
        assert!(err.issues().is_empty());
        assert!(!err.has_duplicate_library_name());
    }
}
