//! Per-library release planning.

use std::collections::BTreeMap;

use git2::Repository;
use semver::Version;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, LegacyState, determine_tag_format, format_tag};
use crate::conventional::{ConventionalCommit, parse_commit};
use crate::error::{ParseError, ReleaseError};
use crate::git::{fetch_commits, resolve_release_range};
use crate::version::{BumpType, apply_bump_to_version, determine_bump_type, parse_version_or_zero};

/// One library's planned release.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryRelease {
    pub name: String,
    pub previous_version: Version,
    pub next_version: Version,
    #[serde(skip)]
    pub bump: BumpType,
    /// Tag for `next_version`.
    pub tag: String,
    /// Tag of the previous release, if the library was released before.
    pub previous_tag: Option<String>,
    pub changes: Vec<ConventionalCommit>,
}

/// Every library release that will happen together.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReleasePlan {
    pub releases: Vec<LibraryRelease>,
}

impl ReleasePlan {
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Record the planned versions in the configuration.
    pub fn apply(&self, config: &mut Config) {
        for release in &self.releases {
            match config.library_mut(&release.name) {
                Some(library) => library.version = release.next_version.to_string(),
                None => warn!(library = %release.name, "Planned library is not in the configuration"),
            }
        }
    }
}

/// Plan releases for every configured library with releasable changes.
///
/// Libraries marked `skip_release`, and libraries without commits, are left
/// out of the plan.
pub fn plan_release(
    config: &Config,
    state: &LegacyState,
    commits_by_library: &BTreeMap<String, Vec<ConventionalCommit>>,
) -> ReleasePlan {
    let mut releases = Vec::new();

    for library in config.effective_libraries() {
        if library.skip_release {
            debug!(library = %library.name, "Skipping release (skip_release)");
            continue;
        }
        let changes = commits_by_library
            .get(&library.name)
            .cloned()
            .unwrap_or_default();
        let bump = determine_bump_type(&changes);
        if bump == BumpType::None {
            debug!(library = %library.name, "No changes to release");
            continue;
        }

        let tag_format = determine_tag_format(&library.name, &state.library(&library.name), Some(config));
        let previous_version = parse_version_or_zero(&library.name, &library.version);
        let next_version = apply_bump_to_version(&previous_version, bump);
        let previous_tag = (!library.version.is_empty())
            .then(|| format_tag(&tag_format, &library.name, &previous_version.to_string()));
        let tag = format_tag(&tag_format, &library.name, &next_version.to_string());

        info!(
            library = %library.name,
            from = %previous_version,
            to = %next_version,
            ?bump,
            "Planned release"
        );
        releases.push(LibraryRelease {
            name: library.name,
            previous_version,
            next_version,
            bump,
            tag,
            previous_tag,
            changes,
        });
    }

    ReleasePlan { releases }
}

/// Gather the conventional commits for each releasable library.
///
/// Each library's history starts after the tag of its current version and
/// is limited to commits touching its output directory. Commit messages are
/// parsed with the library name as the default id, and records that name a
/// different library are dropped.
pub fn collect_library_commits(
    repo: &Repository,
    config: &Config,
    state: &LegacyState,
) -> Result<BTreeMap<String, Vec<ConventionalCommit>>, ReleaseError> {
    let mut by_library = BTreeMap::new();

    for library in config.effective_libraries() {
        if library.skip_release {
            continue;
        }

        let last_tag = (!library.version.is_empty()).then(|| {
            let tag_format =
                determine_tag_format(&library.name, &state.library(&library.name), Some(config));
            format_tag(&tag_format, &library.name, &library.version)
        });
        let range = resolve_release_range(repo, last_tag.as_deref())?;
        let output = config.library_output(&library.name);
        let paths = vec![output.to_string_lossy().into_owned()];
        let raw_commits = fetch_commits(repo, range.from, range.to, &paths)?;
        debug!(
            library = %library.name,
            since = %range.from_ref,
            count = raw_commits.len(),
            "Collected commits"
        );

        let mut changes = Vec::new();
        for raw in &raw_commits {
            match parse_commit(raw, &library.name) {
                Ok(records) => changes.extend(
                    records
                        .into_iter()
                        .filter(|record| record.library_id == library.name),
                ),
                Err(ParseError::EmptyCommitMessage) => {
                    warn!(library = %library.name, commit = %raw.hash, "Skipping commit with empty message");
                }
                Err(e) => {
                    warn!(library = %library.name, commit = %raw.hash, "Skipping commit: {}", e);
                }
            }
        }
        by_library.insert(library.name, changes);
    }

    Ok(by_library)
}
