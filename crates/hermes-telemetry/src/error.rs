//! Telemetry error types.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// The parser error.
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(#[from] TryInitError),

    /// Unknown log format name.
    #[error("Unknown log format '{0}', expected 'json' or 'pretty'")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::UnknownFormat("xml".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown log format 'xml', expected 'json' or 'pretty'"
        );
    }

    #[test]
    fn test_invalid_filter_display() {
        let source = "hermes=verbose".parse::<tracing_subscriber::filter::Directive>().unwrap_err();
        let err = TelemetryError::InvalidFilter {
            filter: "hermes=verbose".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid log filter 'hermes=verbose'"));
    }
}
