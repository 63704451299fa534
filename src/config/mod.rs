//! Declarative library configuration: model, YAML I/O, defaults, tags.

pub mod defaults;
pub mod model;
pub mod naming;
pub mod state;
pub mod tag;
pub mod validate;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub use defaults::{fill_defaults, fill_rust_defaults};
pub use model::{
    Channel, Config, Library, LibraryDefaults, RustCrate, RustDefault, RustPackageDependency,
    Source, Sources,
};
pub use naming::derive_library_name;
pub use state::{LegacyLibraryState, LegacyState};
pub use tag::{DEFAULT_TAG_FORMAT, determine_tag_format, format_tag};
pub use validate::validate_libraries;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "librarian.yaml";

/// Default location of the deprecated state file.
pub const LEGACY_STATE_FILE: &str = ".librarian/state.yaml";

impl Config {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize as is. [`Config::write`] is what sorts.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(ConfigError::Serialize)
    }

    /// Read and validate a configuration file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content, path)?;
        validate_libraries(&config.libraries)?;
        Ok(config)
    }

    /// Write the configuration in canonical order.
    ///
    /// The file is replaced atomically so a failed write never leaves a
    /// truncated configuration behind.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let mut canonical = self.clone();
        canonical.format();
        let content = canonical.to_yaml()?;
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// Sort libraries, channels and Rust dependencies into canonical order.
    pub fn format(&mut self) {
        self.libraries.sort_by(|a, b| a.name.cmp(&b.name));
        for library in &mut self.libraries {
            library.channels.sort_by(|a, b| a.path.cmp(&b.path));
            if let Some(rust) = &mut library.rust {
                rust.package_dependencies.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }
        if let Some(rust) = &mut self.default.rust {
            rust.package_dependencies.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// The explicitly configured library named `name`.
    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.name == name)
    }

    pub fn library_mut(&mut self, name: &str) -> Option<&mut Library> {
        self.libraries.iter_mut().find(|l| l.name == name)
    }

    /// The library with defaults applied.
    ///
    /// Libraries that are not listed still exist with default settings.
    pub fn effective_library(&self, name: &str) -> Library {
        let mut library = self
            .library(name)
            .cloned()
            .unwrap_or_else(|| Library::named(name));
        fill_defaults(&mut library, &self.default);
        library
    }

    /// Directory a library is generated into.
    ///
    /// A library's own `output` is used as is; otherwise the library gets a
    /// directory named after it below the default output.
    pub fn library_output(&self, name: &str) -> PathBuf {
        match self.library(name) {
            Some(lib) if !lib.output.is_empty() => PathBuf::from(&lib.output),
            _ => Path::new(&self.default.output).join(name),
        }
    }

    /// Every listed library with defaults applied.
    pub fn effective_libraries(&self) -> Vec<Library> {
        self.libraries
            .iter()
            .map(|l| self.effective_library(&l.name))
            .collect()
    }
}
