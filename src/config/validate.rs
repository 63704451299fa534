//! Library uniqueness checks.

use std::collections::HashSet;

use crate::error::{ConfigError, ValidationIssue};

use super::model::Library;

/// Check that library names and channel paths are unique.
///
/// Every violation is collected; the returned error lists all of them.
pub fn validate_libraries(libraries: &[Library]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    let mut issues = Vec::new();

    for library in libraries {
        if !names.insert(library.name.as_str()) {
            issues.push(ValidationIssue::DuplicateLibraryName(library.name.clone()));
        }
        for channel in &library.channels {
            if !paths.insert(channel.path.as_str()) {
                issues.push(ValidationIssue::DuplicateChannelPath {
                    path: channel.path.clone(),
                    library: library.name.clone(),
                });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(issues))
    }
}
