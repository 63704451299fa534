//! Streaming HTTP downloads.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::FetchError;

use super::retry::{RetryPolicy, retry_with_policy};

fn http_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent(format!("librarian/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Removes a partially written download unless it was completed.
struct PartialFile {
    path: PathBuf,
    keep: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> FetchError + '_ {
    move |source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Download `url` to `dest`, retrying transient failures according to
/// `policy`.
///
/// The body is streamed to `<dest>.part` and renamed into place once
/// complete, so `dest` never holds a truncated file.
pub async fn download(
    url: &str,
    dest: &Path,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<(), FetchError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    retry_with_policy(policy, cancel, || download_once(url, dest, cancel)).await?;
    info!(url, dest = %dest.display(), "Download complete");
    Ok(())
}

async fn download_once(
    url: &str,
    dest: &Path,
    cancel: &CancellationToken,
) -> Result<(), FetchError> {
    debug!(url, "Requesting");
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        response = http_client().get(url).send() => response.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut partial_name = dest.as_os_str().to_owned();
    partial_name.push(".part");
    let partial = PathBuf::from(partial_name);

    let mut file = tokio::fs::File::create(&partial)
        .await
        .map_err(io_error(&partial))?;
    let mut guard = PartialFile::new(partial.clone());

    let mut stream = response.bytes_stream();
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            next = stream.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(io_error(&partial))?;
    }
    file.flush().await.map_err(io_error(&partial))?;
    drop(file);

    tokio::fs::rename(&partial, dest)
        .await
        .map_err(io_error(dest))?;
    guard.keep = true;
    Ok(())
}
