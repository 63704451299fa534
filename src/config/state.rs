//! The deprecated per-repository state file.
//!
//! Older repositories recorded tag formats and versions in
//! `.librarian/state.yaml`. It is still read so tag formats declared there
//! keep working until they move into the configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyState {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,

    pub libraries: Vec<LegacyLibraryState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyLibraryState {
    pub id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_generated_commit: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag_format: String,
}

impl LegacyState {
    /// Read the state file, returning an empty state when it does not exist.
    pub fn read_optional(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The state entry for `id`, or an empty entry carrying only the id.
    pub fn library(&self, id: &str) -> LegacyLibraryState {
        self.libraries
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .unwrap_or_else(|| LegacyLibraryState {
                id: id.to_string(),
                ..LegacyLibraryState::default()
            })
    }
}
