//! Structured logging for Hermes.
//!
//! The dispatch pipeline emits `tracing` events and spans; this crate
//! installs the subscriber that renders them.
//!
//! - [`LogConfig`] - Level filter, output format and layer options
//! - [`init_logging`] - Installs the global subscriber
//! - [`logging::fields`] - Field names the pipeline records
//!
//! # Events
//!
//! All events are recorded inside a `json_request` span carrying
//! `request_id`, `http.method` and `http.path`.
//!
//! | Event | Level | Fields |
//! |-------|-------|--------|
//! | request completed | `info` / `error` (5xx) | `http.status_code`, `duration_ms` |
//! | preprocessor halted request | `debug` | `chain`, `stage`, `preprocessor`, `status` |
//! | parameter extraction failed | `warn` | `parameter`, `code` |
//! | handler panicked | `error` | `error` |
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig::production()
//!     .with_level("hermes_dispatch=debug,info")
//!     .with_format(LogFormat::Json);
//!
//! init_logging(&config)?;
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::fields;
pub use logging::{create_env_filter, init_logging, init_test_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
