//! Default filling for libraries.

use super::model::{Library, LibraryDefaults, RustCrate, RustDefault};

/// Fill unset library fields from the defaults.
///
/// A field counts as unset when it is the empty string. Values the library
/// sets are never changed.
pub fn fill_defaults(library: &mut Library, defaults: &LibraryDefaults) {
    fill_if_empty(&mut library.output, &defaults.output);
    fill_if_empty(&mut library.release_level, &defaults.release_level);
    fill_if_empty(&mut library.transport, &defaults.transport);

    if let Some(rust_default) = &defaults.rust {
        let rust = library.rust.get_or_insert_with(RustCrate::default);
        fill_rust_defaults(rust, rust_default);
    }
}

fn fill_if_empty(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

/// Merge Rust defaults into a crate's settings.
///
/// Dependencies merge by name with the crate's entries winning. Disabled
/// rustdoc warnings are replaced as a whole, and only when the crate lists
/// none.
pub fn fill_rust_defaults(rust: &mut RustCrate, defaults: &RustDefault) {
    let missing: Vec<_> = defaults
        .package_dependencies
        .iter()
        .filter(|dep| !rust.package_dependencies.iter().any(|d| d.name == dep.name))
        .cloned()
        .collect();
    rust.package_dependencies.extend(missing);

    if rust.disabled_rustdoc_warnings.is_empty() {
        rust.disabled_rustdoc_warnings = defaults.disabled_rustdoc_warnings.clone();
    }
}
