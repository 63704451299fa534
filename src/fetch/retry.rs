//! Exponential backoff retry with an explicit policy.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::FetchError;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, base 1s, max 30s.
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

impl FetchError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { .. } | FetchError::Io { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Run `attempt` until it succeeds, fails permanently, or `policy.attempts`
/// is used up.
///
/// Cancellation is checked before each attempt and interrupts backoff sleeps.
pub async fn retry_with_policy<T, Fut, F>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut attempt: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut backoff = policy.backoff();
    let max_attempts = policy.attempts.max(1);
    let mut attempts = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        attempts += 1;

        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => e,
        };

        if attempts >= max_attempts {
            return Err(FetchError::RetriesExhausted {
                attempts,
                last: Box::new(err),
            });
        }

        let wait = backoff.next_backoff().unwrap_or(policy.max_interval);
        warn!(attempt = attempts, ?wait, "Attempt failed, retrying: {}", err);
        tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }
    }
}
