//! Conventional commit header and body parsing.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::warn;

use crate::error::ParseError;

use super::footer::{parse_footers, split_body_and_footers};
use super::markers::{CommitPart, extract_override, split_parts};
use super::{ConventionalCommit, RawCommit};

// type(scope)!: description
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]*)\))?(!)?:\s(.*)$").expect("header pattern is valid")
});

static LIBRARY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("library id pattern is valid"));

/// Parse a raw commit into conventional commit records.
///
/// Parts that fail to parse are logged and skipped. Records sharing the same
/// subject and library id are collapsed, keeping the first.
pub fn parse_commit(
    commit: &RawCommit,
    default_library_id: &str,
) -> Result<Vec<ConventionalCommit>, ParseError> {
    if commit.message.trim().is_empty() {
        return Err(ParseError::EmptyCommitMessage);
    }

    let message = extract_override(&commit.message);
    if message.trim().is_empty() {
        warn!(hash = %commit.hash, "Override block is empty; no records");
        return Ok(Vec::new());
    }
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut commits = Vec::new();

    for part in split_parts(message) {
        let parsed = match parse_simple_commit(&part, commit, default_library_id) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(hash = %commit.hash, nested = part.is_nested, "Skipping commit part: {}", e);
                continue;
            }
        };

        for c in parsed {
            if seen.insert((c.subject.clone(), c.library_id.clone())) {
                commits.push(c);
            }
        }
    }

    Ok(commits)
}

/// A header that has been seen but whose subject and body are still growing.
struct Pending<'a> {
    commit_type: String,
    scope: Option<String>,
    breaking: bool,
    library_id: String,
    subject: String,
    body: Vec<&'a str>,
    in_body: bool,
}

impl<'a> Pending<'a> {
    fn push_line(&mut self, line: &'a str) {
        if self.in_body {
            self.body.push(line);
        } else if line.trim().is_empty() {
            self.in_body = true;
        } else {
            self.subject.push(' ');
            self.subject.push_str(line.trim());
        }
    }
}

/// Parse one commit part into zero or more records.
///
/// Every header line (`type(scope)!: description`) in the part starts a new
/// record; footers found at the end of the part are shared by all of them.
pub fn parse_simple_commit(
    part: &CommitPart,
    commit: &RawCommit,
    default_library_id: &str,
) -> Result<Vec<ConventionalCommit>, ParseError> {
    let trimmed = part.message.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyCommitPart);
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let (body_lines, footer_lines) = split_body_and_footers(&lines);
    let footers = parse_footers(&footer_lines);

    let mut pending: Vec<Pending<'_>> = Vec::new();
    for line in body_lines {
        if let Some(caps) = HEADER_RE.captures(line) {
            let (subject, library_id) = split_library_id(&caps[4], default_library_id);
            pending.push(Pending {
                commit_type: caps[1].to_string(),
                scope: caps.get(2).map(|m| m.as_str().to_string()),
                breaking: caps.get(3).is_some(),
                library_id,
                subject,
                body: Vec::new(),
                in_body: false,
            });
            continue;
        }

        match pending.last_mut() {
            Some(current) => current.push_line(line),
            None if line.trim().is_empty() => {}
            None => {
                warn!(hash = %commit.hash, line, "Skipping line before conventional commit header");
            }
        }
    }

    Ok(pending
        .into_iter()
        .map(|p| ConventionalCommit {
            commit_type: p.commit_type,
            scope: p.scope,
            subject: p.subject.trim().to_string(),
            body: p.body.join("\n").trim().to_string(),
            library_id: p.library_id,
            footers: footers.values.clone(),
            is_breaking: p.breaking || footers.is_breaking,
            is_nested: part.is_nested,
            commit_hash: commit.hash.clone(),
            when: commit.when,
        })
        .collect())
}

/// Remove a `[library-id]` token from a description.
///
/// Returns the remaining description and the library id, falling back to
/// `default_library_id` when no token is present.
fn split_library_id(description: &str, default_library_id: &str) -> (String, String) {
    let Some(m) = LIBRARY_ID_RE.captures(description) else {
        return (description.trim().to_string(), default_library_id.to_string());
    };
    let (Some(whole), Some(id)) = (m.get(0), m.get(1)) else {
        return (description.trim().to_string(), default_library_id.to_string());
    };

    let before = description[..whole.start()].trim();
    let after = description[whole.end()..].trim();
    let subject = [before, after]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (subject, id.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn raw(message: &str) -> RawCommit {
        RawCommit::new(
            message,
            "0123456789abcdef",
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        )
    }

    fn part(message: &str) -> CommitPart {
        CommitPart {
            message: message.to_string(),
            is_nested: false,
        }
    }

    #[test]
    fn test_breaking_change_footer_example() {
        let commits = parse_commit(
            &raw("feat: add new feature\n\nBREAKING CHANGE: this is a breaking change"),
            "example-id",
        )
        .unwrap();

        assert_eq!(commits.len(), 1);
        let c = &commits[0];
        assert_eq!(c.commit_type, "feat");
        assert_eq!(c.subject, "add new feature");
        assert_eq!(c.library_id, "example-id");
        assert!(c.is_breaking);
        assert!(!c.is_nested);
        assert_eq!(c.footers.len(), 1);
        assert_eq!(c.footers["BREAKING CHANGE"], "this is a breaking change");
        assert_eq!(c.commit_hash, "0123456789abcdef");
    }

    #[test]
    fn test_header_continuation_and_body() {
        let commits = parse_simple_commit(
            &part("fix(storage)!: handle a very\nlong subject line\n\nbody one\nbody two"),
            &raw("unused"),
            "lib",
        )
        .unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "handle a very long subject line");
        assert_eq!(commits[0].body, "body one\nbody two");
        assert_eq!(commits[0].scope.as_deref(), Some("storage"));
        assert!(commits[0].is_breaking);
    }

    #[test]
    fn test_multiple_headers_in_one_part() {
        let commits = parse_simple_commit(
            &part("feat: first\nfeat: second\n\nPiperOrigin-RevId: 42"),
            &raw("unused"),
            "lib",
        )
        .unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].subject, "first");
        assert_eq!(commits[1].subject, "second");
        assert_eq!(commits[1].footers["PiperOrigin-RevId"], "42");
    }

    #[test]
    fn test_library_id_token_overrides_default() {
        let commits = parse_simple_commit(
            &part("feat: [google-cloud-kms] add rotation\nfix: without id"),
            &raw("unused"),
            "default-lib",
        )
        .unwrap();

        assert_eq!(commits[0].library_id, "google-cloud-kms");
        assert_eq!(commits[0].subject, "add rotation");
        assert_eq!(commits[1].library_id, "default-lib");
    }

    #[test]
    fn test_lines_before_header_are_skipped() {
        let commits = parse_simple_commit(
            &part("Some preamble\nfeat: real"),
            &raw("unused"),
            "lib",
        )
        .unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "real");
    }

    #[test]
    fn test_empty_part_is_an_error() {
        let result = parse_simple_commit(&part("   \n"), &raw("unused"), "lib");
        assert_eq!(result, Err(ParseError::EmptyCommitPart));
    }

    #[test]
    fn test_empty_message_is_an_error() {
        assert_eq!(
            parse_commit(&raw(" \n\t "), "lib"),
            Err(ParseError::EmptyCommitMessage)
        );
    }

    #[test]
    fn test_split_library_id_in_middle() {
        let (subject, id) = split_library_id("add [lib-a] support", "d");
        assert_eq!(subject, "add support");
        assert_eq!(id, "lib-a");
    }
}
