//! Read existing changelog using parse-changelog.

use std::path::Path;

use semver::Version;
use tracing::debug;

use crate::error::ChangelogError;

/// Parsed changelog information.
#[derive(Debug)]
pub struct ParsedChangelog {
    pub versions: Vec<String>,
    pub raw_content: String,
}

impl ParsedChangelog {
    /// Whether a section for `version` already exists.
    pub fn has_version(&self, version: &Version) -> bool {
        let wanted = version.to_string();
        let bracketed = format!("## [{}]", wanted);
        let plain = format!("## {} ", wanted);
        self.versions.iter().any(|v| *v == wanted)
            || self
                .raw_content
                .lines()
                .any(|l| l.starts_with(&bracketed) || l.starts_with(&plain))
    }
}

/// Read and parse an existing changelog file.
pub fn read_changelog(path: &Path) -> Result<Option<ParsedChangelog>, ChangelogError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(ChangelogError::ReadFailed)?;

    // A changelog with a header but no releases yet does not parse.
    let versions = match parse_changelog::parse(&content) {
        Ok(changelog) => changelog
            .values()
            .map(|release| release.version.trim_start_matches('v').to_string())
            .collect(),
        Err(e) => {
            debug!(path = %path.display(), "No releases parsed from changelog: {}", e);
            Vec::new()
        }
    };

    Ok(Some(ParsedChangelog {
        versions,
        raw_content: content,
    }))
}

/// The body of the section for `version`, without its heading.
pub fn section_for_version(content: &str, version: &Version) -> Option<String> {
    let wanted = version.to_string();
    let mut lines = content.lines();
    lines.find(|line| heading_version(line) == Some(wanted.as_str()))?;
    let body: Vec<&str> = lines.take_while(|line| !line.starts_with("## ")).collect();
    Some(body.join("\n").trim().to_string())
}

/// The version named by a `## ` release heading.
fn heading_version(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("## ")?;
    let token = match rest.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next()?,
        None => rest.split_whitespace().next()?,
    };
    Some(token.trim_start_matches('v'))
}

/// Find the position to insert a new version section.
/// Returns the byte offset after the header and any [Unreleased] section.
pub fn find_insertion_point(content: &str) -> usize {
    let lines: Vec<&str> = content.lines().collect();
    let mut pos = 0;

    for (i, line) in lines.iter().enumerate() {
        if line.starts_with("## ") {
            if line.to_lowercase().contains("unreleased") {
                for (j, next_line) in lines[i + 1..].iter().enumerate() {
                    if next_line.starts_with("## ") {
                        return lines.iter().take(i + j + 1).map(|l| l.len() + 1).sum();
                    }
                }
                return content.len();
            }
            return lines.iter().take(i).map(|l| l.len() + 1).sum();
        }

        pos += line.len() + 1;
    }

    pos.min(content.len())
}
