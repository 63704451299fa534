//! Local cache of source repository archives.
//!
//! ```text
//! <root>/<repo>/<commit>.tar.gz   downloaded archive
//! <root>/<repo>/<commit>/         extracted tree, top-level directory stripped
//! ```

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tar::Archive;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Source, Sources};
use crate::error::FetchError;

use super::retry::RetryPolicy;
use super::tarball::{download, io_error};

/// Environment variable overriding the cache directory.
pub const CACHE_ENV: &str = "LIBRARIAN_CACHE";

const GITHUB: &str = "https://github.com";

/// GitHub repository backing a configured source.
fn source_repository(name: &str) -> Option<&'static str> {
    match name {
        "googleapis" => Some("googleapis/googleapis"),
        "discovery" => Some("googleapis/discovery-artifact-manager"),
        _ => None,
    }
}

/// Downloads, verifies and unpacks pinned source archives.
#[derive(Debug, Clone)]
pub struct SourceCache {
    root: PathBuf,
    base_url: String,
    policy: RetryPolicy,
}

impl SourceCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: GITHUB.to_string(),
            policy: RetryPolicy::default(),
        }
    }

    /// Cache rooted at `$LIBRARIAN_CACHE`, or `$HOME/.cache/librarian`.
    pub fn from_env() -> Self {
        let root = match std::env::var(CACHE_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => match std::env::var("HOME") {
                Ok(home) if !home.is_empty() => PathBuf::from(home).join(".cache").join("librarian"),
                _ => std::env::temp_dir().join("librarian"),
            },
        };
        Self::new(root)
    }

    /// Download archives from a different host, e.g. a mirror or test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the named source from `sources` to a directory on disk.
    pub async fn resolve_named(
        &self,
        sources: &Sources,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, FetchError> {
        let source = sources
            .get(name)
            .ok_or_else(|| FetchError::MissingSource(name.to_string()))?;
        self.resolve(name, source, cancel).await
    }

    /// Resolve a source to a directory on disk.
    ///
    /// A configured `dir` is returned as is. Otherwise the archive for
    /// `commit` is downloaded (unless cached), checked against `sha256`
    /// and extracted.
    pub async fn resolve(
        &self,
        name: &str,
        source: &Source,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, FetchError> {
        if !source.dir.is_empty() {
            debug!(source = name, dir = %source.dir, "Using local source directory");
            return Ok(PathBuf::from(&source.dir));
        }
        if source.commit.is_empty() {
            return Err(FetchError::UnpinnedSource(name.to_string()));
        }
        let repository =
            source_repository(name).ok_or_else(|| FetchError::MissingSource(name.to_string()))?;

        let repo_dir = self
            .root
            .join(repository.rsplit('/').next().unwrap_or(repository));
        let extracted = repo_dir.join(&source.commit);
        if extracted.is_dir() {
            debug!(source = name, dir = %extracted.display(), "Source cache hit");
            return Ok(extracted);
        }

        let tarball = repo_dir.join(format!("{}.tar.gz", source.commit));
        let cached_ok = tarball.is_file()
            && (source.sha256.is_empty()
                || sha256_file(&tarball)?.eq_ignore_ascii_case(&source.sha256));
        if !cached_ok {
            let url = format!(
                "{}/{}/archive/{}.tar.gz",
                self.base_url, repository, source.commit
            );
            info!(source = name, commit = %source.commit, "Downloading source archive");
            download(&url, &tarball, &self.policy, cancel).await?;
            verify_checksum(&tarball, &source.sha256)?;
        }

        extract_stripped(&tarball, &extracted)?;
        Ok(extracted)
    }
}

/// Hex-encoded sha256 of a file.
pub fn sha256_file(path: &Path) -> Result<String, FetchError> {
    let mut file = File::open(path).map_err(io_error(path))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(io_error(path))?;
    Ok(format!("{:x}", hasher.finalize()))
}

fn verify_checksum(path: &Path, expected: &str) -> Result<(), FetchError> {
    if expected.is_empty() {
        warn!(path = %path.display(), "No sha256 configured; skipping verification");
        return Ok(());
    }
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        let _ = std::fs::remove_file(path);
        return Err(FetchError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Unpack a `.tar.gz` into `dest`, dropping the archive's top-level
/// directory. Entries that would escape `dest` are skipped.
pub fn extract_stripped(archive_path: &Path, dest: &Path) -> Result<(), FetchError> {
    let extract_error = |source: std::io::Error| FetchError::Extract {
        path: archive_path.to_path_buf(),
        source,
    };

    let mut staging_name = dest.as_os_str().to_owned();
    staging_name.push(".partial");
    let staging = PathBuf::from(staging_name);
    if staging.exists() {
        std::fs::remove_dir_all(&staging).map_err(io_error(&staging))?;
    }
    std::fs::create_dir_all(&staging).map_err(io_error(&staging))?;

    let file = File::open(archive_path).map_err(io_error(archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    for entry in archive.entries().map_err(extract_error)? {
        let mut entry = entry.map_err(extract_error)?;
        let path = entry.path().map_err(extract_error)?.into_owned();

        let relative: PathBuf = path.components().skip(1).collect();
        if relative.as_os_str().is_empty() {
            continue;
        }
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            warn!(entry = %path.display(), "Skipping archive entry outside destination");
            continue;
        }

        let target = staging.join(&relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        entry.unpack(&target).map_err(extract_error)?;
    }

    std::fs::rename(&staging, dest).map_err(io_error(dest))?;
    debug!(dest = %dest.display(), "Extracted archive");
    Ok(())
}
