//! Override and nested-commit block extraction.

/// Override marker pairs, tried in order.
pub const OVERRIDE_MARKERS: &[(&str, &str)] = &[
    ("BEGIN_COMMIT_OVERRIDE", "END_COMMIT_OVERRIDE"),
    ("BEGIN_COMMIT", "END_COMMIT"),
];

pub const BEGIN_NESTED_COMMIT: &str = "BEGIN_NESTED_COMMIT";
pub const END_NESTED_COMMIT: &str = "END_NESTED_COMMIT";

/// One independently parsed section of a commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPart {
    pub message: String,
    pub is_nested: bool,
}

/// Return the content of the first complete override block, or the whole
/// message when no complete block exists.
pub fn extract_override(message: &str) -> &str {
    for (begin, end) in OVERRIDE_MARKERS {
        let Some(start) = find_marker(message, begin) else {
            continue;
        };
        let content_start = start + begin.len();
        if let Some(len) = find_marker(&message[content_start..], end) {
            return &message[content_start..content_start + len];
        }
    }
    message
}

/// Offset of the first occurrence of `marker` that is not the prefix of a
/// longer marker (`BEGIN_COMMIT` inside `BEGIN_COMMIT_OVERRIDE`).
fn find_marker(haystack: &str, marker: &str) -> Option<usize> {
    haystack.match_indices(marker).map(|(i, _)| i).find(|&i| {
        !haystack[i + marker.len()..]
            .starts_with(|c: char| c == '_' || c.is_ascii_alphanumeric())
    })
}

/// Split a message into its primary part and any well-formed nested parts.
///
/// Nested parts keep their content even when it is blank; the parser reports
/// those as empty parts so they show up in the logs.
pub fn split_parts(message: &str) -> Vec<CommitPart> {
    let mut sections = message.split(BEGIN_NESTED_COMMIT);
    let mut parts = Vec::new();

    if let Some(primary) = sections.next()
        && !primary.trim().is_empty()
    {
        parts.push(CommitPart {
            message: primary.trim().to_string(),
            is_nested: false,
        });
    }

    for section in sections {
        match section.find(END_NESTED_COMMIT) {
            Some(end) => parts.push(CommitPart {
                message: section[..end].trim().to_string(),
                is_nested: true,
            }),
            None => {
                tracing::warn!("Dropping nested commit without {}", END_NESTED_COMMIT);
            }
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_extracts_inner_content() {
        let msg = "ignored\nBEGIN_COMMIT\nfeat: kept\nEND_COMMIT\nalso ignored";
        assert_eq!(extract_override(msg).trim(), "feat: kept");
    }

    #[test]
    fn test_deprecated_override_is_not_split_by_shorter_marker() {
        let msg = "BEGIN_COMMIT_OVERRIDE\nfix: kept\nEND_COMMIT_OVERRIDE";
        assert_eq!(extract_override(msg).trim(), "fix: kept");
    }

    #[test]
    fn test_unterminated_deprecated_marker_does_not_leak_into_override() {
        let msg = "outer\nBEGIN_COMMIT_OVERRIDE\nfeat: a\n\nBEGIN_COMMIT\nfix: real\nEND_COMMIT";
        assert_eq!(extract_override(msg).trim(), "fix: real");
    }

    #[test]
    fn test_end_marker_prefix_is_not_matched() {
        let msg = "BEGIN_COMMIT\nfix: real\nEND_COMMIT_OVERRIDE\nEND_COMMIT\nfeat: outside";
        assert_eq!(extract_override(msg).trim(), "fix: real\nEND_COMMIT_OVERRIDE");
    }

    #[test]
    fn test_override_without_end_marker_keeps_message() {
        let msg = "feat: original\nBEGIN_COMMIT\nfeat: never closed";
        assert_eq!(extract_override(msg), msg);
    }

    #[test]
    fn test_split_primary_and_nested() {
        let msg = "feat: primary\n\nBEGIN_NESTED_COMMIT\nfix: nested\nEND_NESTED_COMMIT\n";
        let parts = split_parts(msg);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].message, "feat: primary");
        assert!(!parts[0].is_nested);
        assert_eq!(parts[1].message, "fix: nested");
        assert!(parts[1].is_nested);
    }

    #[test]
    fn test_unterminated_nested_block_is_dropped() {
        let msg = "BEGIN_NESTED_COMMIT\nfix: one\nEND_NESTED_COMMIT\nBEGIN_NESTED_COMMIT\nfix: two";
        let parts = split_parts(msg);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].message, "fix: one");
    }

    #[test]
    fn test_blank_primary_is_skipped() {
        let parts = split_parts("  \n\nBEGIN_NESTED_COMMIT\nfix: one\nEND_NESTED_COMMIT");
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_nested);
    }
}
