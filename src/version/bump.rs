//! Semver calculation from conventional commits.

use semver::Version;
use tracing::warn;

use crate::conventional::ConventionalCommit;

/// Type of version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BumpType {
    None,
    Patch,
    Minor,
    Major,
}

/// Determine the bump type from a list of commits.
///
/// - Breaking changes = major bump
/// - feat: commits = minor bump
/// - anything else = patch bump
/// - no commits = no bump
pub fn determine_bump_type(commits: &[ConventionalCommit]) -> BumpType {
    let mut highest_bump = BumpType::None;

    for commit in commits {
        // Breaking changes always trigger major bump
        if commit.is_breaking {
            return BumpType::Major;
        }

        let bump = if commit.is_feature() {
            BumpType::Minor
        } else {
            BumpType::Patch
        };
        highest_bump = highest_bump.max(bump);
    }

    highest_bump
}

/// Apply a bump to a version, clearing pre-release and build metadata.
pub fn apply_bump_to_version(base: &Version, bump: BumpType) -> Version {
    match bump {
        BumpType::None => base.clone(),
        BumpType::Major => Version::new(base.major + 1, 0, 0),
        BumpType::Minor => Version::new(base.major, base.minor + 1, 0),
        BumpType::Patch => Version::new(base.major, base.minor, base.patch + 1),
    }
}

/// Parse a configured version, treating an empty or invalid value as 0.0.0.
pub fn parse_version_or_zero(library: &str, version: &str) -> Version {
    if version.is_empty() {
        return Version::new(0, 0, 0);
    }
    Version::parse(version).unwrap_or_else(|e| {
        warn!(library, version, "Invalid version ({}), starting from 0.0.0", e);
        Version::new(0, 0, 0)
    })
}
