//! Global tracing subscriber setup.

use crate::error_layer::{ErrorChannelLayer, ObservabilityEvent};
use penguin_core::config::LoggingConfig;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Filter from `RUST_LOG`, falling back to `config.level`.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    parse_filter(&config.level)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Installs the global subscriber.
///
/// Log lines go to stderr so they never interleave with chat output on
/// stdout. When `errors` is given, WARN and ERROR events are also forwarded
/// to it.
///
/// # Errors
///
/// Fails if the filter directive is invalid or a subscriber is already set.
pub fn init_logging(
    config: &LoggingConfig,
    errors: Option<mpsc::UnboundedSender<ObservabilityEvent>>,
) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let error_layer = errors.map(ErrorChannelLayer::new);

    let (text_layer, json_layer) = if config.json {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            ),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(error_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_accepts_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("penguin_application=debug,warn").is_ok());
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        let err = parse_filter("penguin=loud").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter { .. }));
        assert!(err.to_string().contains("penguin=loud"));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let (sender, _receiver) = mpsc::unbounded_channel();

        // Only this test touches the global subscriber.
        let first = init_logging(&config, Some(sender));
        assert!(first.is_ok());
        assert!(matches!(
            init_logging(&config, None),
            Err(LoggingError::AlreadyInitialized)
        ));
    }
}
