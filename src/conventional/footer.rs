//! Footer detection and parsing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex_lite::Regex;

pub const BREAKING_CHANGE_KEY: &str = "BREAKING CHANGE";
pub const SOURCE_LINK_KEY: &str = "Source-Link";

static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z-]+|BREAKING CHANGE):\s(.*)$").expect("footer pattern is valid")
});

// [org/repo@shortsha](https://github.com/org/repo/commit/fullsha)
static SOURCE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+@[^\]]*\]\(https://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+/commit/([0-9a-fA-F]+)\)$",
    )
    .expect("source link pattern is valid")
});

/// Parsed footers of one commit part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footers {
    pub values: BTreeMap<String, String>,
    pub is_breaking: bool,
}

/// Whether `line` starts a footer (`Key: value` or `BREAKING CHANGE: value`).
pub fn is_footer_line(line: &str) -> bool {
    FOOTER_RE.is_match(line)
}

/// Split lines into body and footer lines.
///
/// The footer section begins at the first blank line whose next non-blank
/// line is a footer line. That blank line and everything after belong to the
/// footer section.
pub fn split_body_and_footers<'a>(lines: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
    let footer_start = lines.iter().enumerate().position(|(i, line)| {
        line.trim().is_empty()
            && lines[i + 1..]
                .iter()
                .find(|next| !next.trim().is_empty())
                .is_some_and(|next| is_footer_line(next))
    });

    match footer_start {
        Some(start) => (lines[..start].to_vec(), lines[start + 1..].to_vec()),
        None => (lines.to_vec(), Vec::new()),
    }
}

/// Parse footer lines into key/value pairs.
///
/// The first occurrence of a key wins. A repeated key stops continuation
/// tracking, so the lines after it are not attached to the earlier value.
pub fn parse_footers(lines: &[&str]) -> Footers {
    let mut footers = Footers::default();
    let mut last_key: Option<String> = None;

    for line in lines {
        let Some(caps) = FOOTER_RE.captures(line) else {
            if let Some(key) = &last_key
                && !line.trim().is_empty()
                && let Some(value) = footers.values.get_mut(key)
            {
                value.push('\n');
                value.push_str(line);
            }
            continue;
        };

        let key = caps[1].trim().to_string();
        if footers.values.contains_key(&key) {
            last_key = None;
            continue;
        }
        if key == BREAKING_CHANGE_KEY {
            footers.is_breaking = true;
        }
        footers.values.insert(key.clone(), caps[2].to_string());
        last_key = Some(key);
    }

    for value in footers.values.values_mut() {
        *value = value.trim().to_string();
    }
    if let Some(link) = footers.values.get_mut(SOURCE_LINK_KEY)
        && let Some(sha) = source_link_sha(link)
    {
        *link = sha;
    }

    footers
}

/// Extract the full commit SHA from a GitHub commit link footer value.
pub fn source_link_sha(value: &str) -> Option<String> {
    SOURCE_LINK_RE
        .captures(value)
        .map(|caps| caps[1].to_string())
}
