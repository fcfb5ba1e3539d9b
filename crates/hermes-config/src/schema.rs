//! Configuration schema types.
//!
//! This module defines the structure of each configuration section.

use hermes_dispatch::{EncoderConfig, PipelineSettings, DEFAULT_MAX_BODY_BYTES};
use hermes_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatch pipeline configuration section.
///
/// # Example
///
/// ```
/// use hermes_config::DispatchConfig;
///
/// let config = DispatchConfig {
///     pretty_json: true,
///     body_timeout_ms: Some(5_000),
///     ..Default::default()
/// };
///
/// let settings = config.pipeline_settings();
/// assert!(settings.encoder.pretty);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Pretty-print response bodies.
    #[serde(default)]
    pub pretty_json: bool,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// How long to wait for a full request body. `None` waits forever.
    #[serde(default)]
    pub body_timeout_ms: Option<u64>,

    /// Reject top-level body fields no parameter declares.
    #[serde(default)]
    pub deny_unknown_fields: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pretty_json: false,
            max_body_bytes: default_max_body_bytes(),
            body_timeout_ms: None,
            deny_unknown_fields: false,
        }
    }
}

impl DispatchConfig {
    /// Returns the response encoder settings.
    #[must_use]
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            pretty: self.pretty_json,
        }
    }

    /// Returns the body timeout as a [`Duration`].
    #[must_use]
    pub fn body_timeout(&self) -> Option<Duration> {
        self.body_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the full pipeline settings for a request handler.
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            encoder: self.encoder_config(),
            max_body_bytes: self.max_body_bytes,
            body_timeout: self.body_timeout(),
            deny_unknown_fields: self.deny_unknown_fields,
        }
    }
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info" or "hermes_dispatch=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into a [`LogConfig`].
    ///
    /// Layer options not exposed here come from the preset matching the
    /// format: pretty output gets the development layers, JSON the
    /// production ones.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Pretty => LogConfig::development(),
            LogFormat::Json => LogConfig::production(),
        };

        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ..base
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
