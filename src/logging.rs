//! Logging setup for the CLI.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "LIBRARIAN_LOG";

/// The filter directive to use: `LIBRARIAN_LOG` when set, otherwise `debug`
/// for verbose runs and `warn` for everything else.
pub fn filter_directive(verbose: bool, env_value: Option<&str>) -> String {
    match env_value.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ if verbose => "librarian=debug,info".to_string(),
        _ => "warn".to_string(),
    }
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(verbose: bool) -> Result<(), TryInitError> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = EnvFilter::try_new(filter_directive(verbose, env_value.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).try_init()
}
