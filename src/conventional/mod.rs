//! Conventional commit parsing with override and nested-commit markers.
//!
//! A single raw commit message can carry several logical changes: generation
//! pull requests squash one nested commit per library into one message. The
//! parser turns such a message into a flat list of [`ConventionalCommit`]
//! records, one per header it finds.

pub mod footer;
pub mod markers;
pub mod parser;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use footer::{BREAKING_CHANGE_KEY, SOURCE_LINK_KEY};
pub use parser::{parse_commit, parse_simple_commit};

/// A commit as read from git history, before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    pub message: String,
    pub hash: String,
    pub when: DateTime<Utc>,
}

impl RawCommit {
    pub fn new(message: impl Into<String>, hash: impl Into<String>, when: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            hash: hash.into(),
            when,
        }
    }
}

/// A single semantic change extracted from a commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalCommit {
    #[serde(rename = "type")]
    pub commit_type: String,
    pub scope: Option<String>,
    pub subject: String,
    pub body: String,
    pub library_id: String,
    pub footers: BTreeMap<String, String>,
    pub is_breaking: bool,
    pub is_nested: bool,
    pub commit_hash: String,
    pub when: DateTime<Utc>,
}

impl ConventionalCommit {
    /// Whether this commit introduces a feature.
    pub fn is_feature(&self) -> bool {
        self.commit_type.eq_ignore_ascii_case("feat")
    }

    /// The abbreviated commit hash used in changelogs.
    pub fn short_hash(&self) -> &str {
        let end = self
            .commit_hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.commit_hash.len());
        &self.commit_hash[..end]
    }
}
