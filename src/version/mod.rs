//! Version management and semver bumping.

pub mod bump;
pub mod manifest;

pub use bump::{BumpType, apply_bump_to_version, determine_bump_type, parse_version_or_zero};
pub use manifest::update_manifest_version;
