//! Changelog parsing and writing.

pub mod format;
pub mod parser;
pub mod writer;

pub use format::{ChangelogEntry, ChangelogSection, ReleaseNotes};
pub use parser::{read_changelog, section_for_version};
pub use writer::{ReleaseLinks, write_changelog};
