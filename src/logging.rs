use crate::config::{LoggingConfig, DEFAULT_LOG_FILTER};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Returns `false` when a subscriber was already installed (the host app or
/// an earlier call got there first); that is not an error.
pub fn init(config: &LoggingConfig) -> bool {
    let (filter, rejected) = build_filter(&config.filter);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok();

    if let Some(e) = rejected {
        tracing::warn!(
            filter = %config.filter,
            error = %e,
            "Invalid log filter, using {DEFAULT_LOG_FILTER}"
        );
    }
    installed
}

fn build_filter(directives: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    }
}
