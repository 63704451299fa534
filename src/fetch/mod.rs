//! Fetching pinned source repositories.

pub mod cache;
pub mod retry;
pub mod tarball;

pub use cache::SourceCache;
pub use retry::{RetryPolicy, retry_with_policy};
pub use tarball::download;
