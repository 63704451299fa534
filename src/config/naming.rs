//! Library name derivation from API paths.

const NAME_PREFIX: &str = "google-cloud-";

/// Derive a library name from an API path.
///
/// `google/cloud/secretmanager/v1` becomes `google-cloud-secretmanager-v1`.
/// Only `api/apikeys` has its `api/` segment removed; other `google/api/*`
/// paths keep it.
pub fn derive_library_name(api_path: &str) -> String {
    let mut path = api_path.strip_prefix("google/").unwrap_or(api_path);
    if path.starts_with("api/apikeys/") {
        path = &path["api/".len()..];
    }
    path = path.strip_prefix("cloud/").unwrap_or(path);
    path = path.strip_prefix("devtools/").unwrap_or(path);

    format!("{}{}", NAME_PREFIX, path.replace('/', "-"))
}
