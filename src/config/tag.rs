//! Release tag format resolution.

use tracing::warn;

use super::model::Config;
use super::state::LegacyLibraryState;

/// Tag format used when nothing else is configured.
pub const DEFAULT_TAG_FORMAT: &str = "{id}-{version}";

/// Resolve the tag format for a library.
///
/// Precedence: the library's entry in `config`, the configuration default,
/// the deprecated state-file entry, then [`DEFAULT_TAG_FORMAT`].
pub fn determine_tag_format(
    library_id: &str,
    state: &LegacyLibraryState,
    config: Option<&Config>,
) -> String {
    if let Some(config) = config {
        if let Some(lib) = config.library(library_id)
            && !lib.tag_format.is_empty()
        {
            return lib.tag_format.clone();
        }
        if !config.default.tag_format.is_empty() {
            warn!(library = library_id, "No tag format for library, using configuration default");
            return config.default.tag_format.clone();
        }
    }

    if !state.tag_format.is_empty() {
        warn!(library = library_id, "Using deprecated tag format from state file");
        return state.tag_format.clone();
    }

    warn!(library = library_id, "No tag format configured, using {}", DEFAULT_TAG_FORMAT);
    DEFAULT_TAG_FORMAT.to_string()
}

/// Substitute `{id}` and `{version}` into a tag format.
pub fn format_tag(tag_format: &str, id: &str, version: &str) -> String {
    let tag_format = if tag_format.is_empty() {
        DEFAULT_TAG_FORMAT
    } else {
        tag_format
    };
    tag_format.replace("{id}", id).replace("{version}", version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{Library, LibraryDefaults};

    fn state(tag_format: &str) -> LegacyLibraryState {
        LegacyLibraryState {
            id: "lib".into(),
            tag_format: tag_format.into(),
            ..LegacyLibraryState::default()
        }
    }

    fn config(library_format: &str, default_format: &str) -> Config {
        Config {
            default: LibraryDefaults {
                tag_format: default_format.into(),
                ..LibraryDefaults::default()
            },
            libraries: vec![Library {
                tag_format: library_format.into(),
                ..Library::named("lib")
            }],
            ..Config::default()
        }
    }

    #[test]
    fn test_library_entry_wins_over_everything() {
        let cfg = config("lib/v{version}", "{id}/v{version}");
        assert_eq!(
            determine_tag_format("lib", &state("state-{version}"), Some(&cfg)),
            "lib/v{version}"
        );
    }

    #[test]
    fn test_config_default_is_second() {
        let cfg = config("", "{id}/v{version}");
        assert_eq!(
            determine_tag_format("lib", &state("state-{version}"), Some(&cfg)),
            "{id}/v{version}"
        );
    }

    #[test]
    fn test_state_is_third() {
        let cfg = config("", "");
        assert_eq!(
            determine_tag_format("lib", &state("state-{version}"), Some(&cfg)),
            "state-{version}"
        );
        assert_eq!(
            determine_tag_format("lib", &state("state-{version}"), None),
            "state-{version}"
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(determine_tag_format("lib", &state(""), None), DEFAULT_TAG_FORMAT);
    }

    #[test]
    fn test_format_tag() {
        assert_eq!(format_tag("{id}-{version}", "foo", "1.2.3"), "foo-1.2.3");
        assert_eq!(format_tag("", "foo", "1.2.3"), "foo-1.2.3");
        assert_eq!(format_tag("v{version}", "foo", "1.2.3"), "v1.2.3");
        assert_eq!(format_tag("{{id}}", "foo", "1"), "{foo}");
    }
}
