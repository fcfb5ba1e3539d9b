//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading or validating a [`HermesConfig`](crate::HermesConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("config file {} does not exist", .path.display())]
    FileNotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A configuration file exists but could not be read.
    #[error("could not read config file {}", .path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax error or unknown field.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON syntax error or unknown field.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `toml` nor `json`.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field, e.g. `dispatch.max_body_bytes`.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An override variable could not be parsed.
    #[error("environment override {var} rejected: {reason}")]
    InvalidEnv {
        /// The variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// The `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates an [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnv {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
