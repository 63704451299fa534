//! Configuration data types.
//!
//! Every field uses the empty string (or an empty list, or `false`) as its
//! "unset" value, and unset values are left out when the file is written.

use serde::{Deserialize, Serialize};

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Root configuration, one per repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target generation language, such as `rust` or `python`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,

    /// GitHub repository in `owner/name` form.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo: String,

    #[serde(skip_serializing_if = "is_default")]
    pub sources: Sources,

    #[serde(skip_serializing_if = "is_default")]
    pub default: LibraryDefaults,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,
}

/// External repositories that API definitions are read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<Source>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub googleapis: Option<Source>,
}

impl Sources {
    /// Look up a source by its configuration key.
    pub fn get(&self, name: &str) -> Option<&Source> {
        match name {
            "googleapis" => self.googleapis.as_ref(),
            "discovery" => self.discovery.as_ref(),
            _ => None,
        }
    }
}

/// A pinned commit of a source repository, or a local checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub commit: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub sha256: String,

    /// Local directory used instead of downloading `commit`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dir: String,
}

/// Settings applied to every library that does not set its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryDefaults {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_level: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub transport: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag_format: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustDefault>,
}

/// One releasable unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub output: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_level: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub transport: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag_format: String,

    #[serde(skip_serializing_if = "is_false")]
    pub skip_generate: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub skip_release: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub skip_publish: bool,

    /// Paths below `output` that survive regeneration.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keep: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust: Option<RustCrate>,
}

impl Library {
    /// A library with only a name; everything else comes from defaults.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Binding from a library to one API definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub path: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_config: String,
}

impl Channel {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            service_config: String::new(),
        }
    }
}

/// Rust settings shared by every crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RustDefault {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub package_dependencies: Vec<RustPackageDependency>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,
}

/// Rust settings for one crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RustCrate {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub module_path: String,

    #[serde(skip_serializing_if = "is_false")]
    pub per_service_features: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub template_override: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub package_dependencies: Vec<RustPackageDependency>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_rustdoc_warnings: Vec<String>,
}

/// A crate dependency of the generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RustPackageDependency {
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub package: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub feature: String,

    #[serde(skip_serializing_if = "is_false")]
    pub force_used: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub used_if: String,
}

impl RustPackageDependency {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            ..Self::default()
        }
    }
}
