//! Release note sections built from conventional commits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conventional::ConventionalCommit;

/// Changelog sections, in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangelogSection {
    Breaking,
    Features,
    BugFixes,
    Performance,
    Reverts,
    Documentation,
    Dependencies,
}

impl ChangelogSection {
    /// Get the display name for the section.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breaking => "⚠ BREAKING CHANGES",
            Self::Features => "Features",
            Self::BugFixes => "Bug Fixes",
            Self::Performance => "Performance Improvements",
            Self::Reverts => "Reverts",
            Self::Documentation => "Documentation",
            Self::Dependencies => "Dependencies",
        }
    }

    /// The section a commit is listed under, or `None` for commit types that
    /// are left out of release notes (chore, ci, test, ...).
    pub fn for_commit(commit: &ConventionalCommit) -> Option<Self> {
        if commit.is_breaking {
            return Some(Self::Breaking);
        }
        match commit.commit_type.to_lowercase().as_str() {
            "feat" => Some(Self::Features),
            "fix" => Some(Self::BugFixes),
            "perf" => Some(Self::Performance),
            "revert" => Some(Self::Reverts),
            "docs" => Some(Self::Documentation),
            "deps" => Some(Self::Dependencies),
            _ => None,
        }
    }
}

/// A single changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub section: ChangelogSection,
    pub description: String,
    pub commit_hash: String,
}

/// The release notes for one library release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotes {
    pub entries: Vec<ChangelogEntry>,
}

impl ReleaseNotes {
    /// Build notes from commits, skipping commit types that are not listed.
    pub fn from_commits(commits: &[ConventionalCommit]) -> Self {
        let entries = commits
            .iter()
            .filter_map(|c| {
                ChangelogSection::for_commit(c).map(|section| ChangelogEntry {
                    section,
                    description: describe(c),
                    commit_hash: c.commit_hash.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group entries by section, sorted in standard order.
    pub fn entries_by_section(&self) -> Vec<(ChangelogSection, Vec<&ChangelogEntry>)> {
        let mut grouped: BTreeMap<ChangelogSection, Vec<&ChangelogEntry>> = BTreeMap::new();
        for entry in &self.entries {
            grouped.entry(entry.section).or_default().push(entry);
        }
        grouped.into_iter().collect()
    }
}

fn describe(commit: &ConventionalCommit) -> String {
    match &commit.scope {
        Some(scope) if !scope.is_empty() => format!("**{}:** {}", scope, commit.subject),
        _ => commit.subject.clone(),
    }
}

/// Header for new changelog files.
pub const CHANGELOG_HEADER: &str = "# Changelog\n\n";
