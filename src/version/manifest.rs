//! Version updates in library package manifests.
//!
//! Supports Cargo.toml and pyproject.toml (PEP 621 + Poetry).

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::debug;

use crate::error::VersionError;

/// Update the package version in the manifest found in `dir`.
///
/// Returns the manifest path when one was updated. Directories without a
/// manifest, and manifests whose version is inherited from a workspace, are
/// left alone.
pub fn update_manifest_version(
    dir: &Path,
    new_version: &Version,
) -> Result<Option<PathBuf>, VersionError> {
    let cargo_path = dir.join("Cargo.toml");
    if cargo_path.exists() {
        let updated = update_toml_version(&cargo_path, new_version, &[&["package", "version"]])?;
        return Ok(updated.then_some(cargo_path));
    }

    let pyproject_path = dir.join("pyproject.toml");
    if pyproject_path.exists() {
        let updated = update_toml_version(
            &pyproject_path,
            new_version,
            &[&["project", "version"], &["tool", "poetry", "version"]],
        )?;
        return Ok(updated.then_some(pyproject_path));
    }

    debug!(dir = %dir.display(), "No manifest to update");
    Ok(None)
}

/// Set the first existing string value among `candidates` to `new_version`.
fn update_toml_version(
    path: &Path,
    new_version: &Version,
    candidates: &[&[&str]],
) -> Result<bool, VersionError> {
    let content = std::fs::read_to_string(path).map_err(|e| VersionError::ManifestUpdate {
        path: path.to_path_buf(),
        reason: format!("Failed to read: {}", e),
    })?;
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| VersionError::ManifestUpdate {
            path: path.to_path_buf(),
            reason: format!("Invalid TOML: {}", e),
        })?;

    for keys in candidates {
        if let Some(value) = string_value_mut(&mut doc, keys) {
            let decor = value.decor().clone();
            *value = toml_edit::Value::from(new_version.to_string());
            *value.decor_mut() = decor;
            std::fs::write(path, doc.to_string()).map_err(|e| VersionError::ManifestUpdate {
                path: path.to_path_buf(),
                reason: format!("Failed to write: {}", e),
            })?;
            return Ok(true);
        }
    }

    Ok(false)
}

/// The string value at `keys`, if present.
///
/// `version.workspace = true` is a table, not a string, so it never matches.
fn string_value_mut<'a>(
    doc: &'a mut toml_edit::DocumentMut,
    keys: &[&str],
) -> Option<&'a mut toml_edit::Value> {
    let (last, tables) = keys.split_last()?;
    let mut item = doc.as_item_mut();
    for table in tables {
        item = item.get_mut(*table)?;
    }
    let value = item.get_mut(*last)?.as_value_mut()?;
    value.is_str().then_some(value)
}
