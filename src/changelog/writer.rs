//! Write new changelog sections.

use std::path::Path;

use chrono::NaiveDate;
use semver::Version;
use tracing::debug;

use crate::error::ChangelogError;

use super::format::{CHANGELOG_HEADER, ReleaseNotes};
use super::parser::{find_insertion_point, read_changelog};

/// Where a release lives on GitHub, used to render links.
#[derive(Debug, Clone, Default)]
pub struct ReleaseLinks<'a> {
    /// `owner/name`; links are omitted when empty.
    pub repo: &'a str,
    pub tag: &'a str,
    pub previous_tag: Option<&'a str>,
}

/// Write a release section to a changelog file.
///
/// - Creates the file with a header if it doesn't exist
/// - Inserts the section above the newest existing release
/// - Leaves the file untouched when the version is already present
///
/// Returns whether the file was written.
pub fn write_changelog(
    path: &Path,
    notes: &ReleaseNotes,
    version: &Version,
    date: NaiveDate,
    links: &ReleaseLinks<'_>,
) -> Result<bool, ChangelogError> {
    let section = format_version_section(version, date, notes, links);

    let new_content = match read_changelog(path)? {
        Some(existing) if existing.has_version(version) => {
            debug!(path = %path.display(), %version, "Changelog already has this version");
            return Ok(false);
        }
        Some(existing) => {
            let insertion_point = find_insertion_point(&existing.raw_content);
            let mut content = String::new();
            content.push_str(&existing.raw_content[..insertion_point]);
            if !content.is_empty() && !content.ends_with("\n\n") {
                content.push('\n');
            }
            content.push_str(&section);
            content.push('\n');
            content.push_str(&existing.raw_content[insertion_point..]);
            content
        }
        None => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(ChangelogError::WriteFailed)?;
            }
            let mut content = CHANGELOG_HEADER.to_string();
            content.push_str(&section);
            content
        }
    };

    std::fs::write(path, new_content).map_err(ChangelogError::WriteFailed)?;
    Ok(true)
}

/// Format a version section.
pub fn format_version_section(
    version: &Version,
    date: NaiveDate,
    notes: &ReleaseNotes,
    links: &ReleaseLinks<'_>,
) -> String {
    let date = date.format("%Y-%m-%d");
    let mut section = if links.repo.is_empty() {
        format!("## {} ({})\n\n", version, date)
    } else {
        let url = match links.previous_tag {
            Some(previous) => format!(
                "https://github.com/{}/compare/{}...{}",
                links.repo, previous, links.tag
            ),
            None => format!("https://github.com/{}/releases/tag/{}", links.repo, links.tag),
        };
        format!("## [{}]({}) ({})\n\n", version, url, date)
    };

    for (section_kind, entries) in notes.entries_by_section() {
        section.push_str(&format!("### {}\n\n", section_kind.as_str()));
        for entry in entries {
            section.push_str(&format!("* {}", entry.description));
            if !links.repo.is_empty() && !entry.commit_hash.is_empty() {
                let short = &entry.commit_hash[..entry.commit_hash.len().min(7)];
                section.push_str(&format!(
                    " ([{}](https://github.com/{}/commit/{}))",
                    short, links.repo, entry.commit_hash
                ));
            }
            section.push('\n');
        }
        section.push('\n');
    }

    section
}
