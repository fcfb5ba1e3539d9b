//! Top-level configuration.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DispatchConfig, LoggingConfig};

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert_eq!(config.logging.level, "info");
/// assert!(!config.dispatch.pretty_json);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Dispatch pipeline configuration.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HermesConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `dispatch.max_body_bytes` is zero
    /// - `dispatch.body_timeout_ms` is zero
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "dispatch.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.dispatch.body_timeout_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "dispatch.body_timeout_ms",
                "must be greater than zero; omit it to wait forever",
            ));
        }

        if self.logging.enabled {
            hermes_telemetry::create_env_filter(&self.logging.level).map_err(|e| {
                ConfigError::invalid_value("logging.level", e.to_string())
            })?;
        }

        Ok(())
    }

    /// Development preset: pretty responses, pretty `debug` logs and
    /// strict bodies.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::HermesConfig;
    ///
    /// let config = HermesConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.dispatch.pretty_json);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.dispatch.pretty_json = true;
        config.dispatch.deny_unknown_fields = true;

        config.logging.level = "debug".to_string();
        config.logging.format = hermes_telemetry::LogFormat::Pretty;

        config
    }

    /// Production preset: compact responses, JSON `info` logs and a body
    /// timeout.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.dispatch.pretty_json = false;
        config.dispatch.body_timeout_ms = Some(30_000);

        config.logging.level = "info".to_string();
        config.logging.format = hermes_telemetry::LogFormat::Json;

        config
    }
}
