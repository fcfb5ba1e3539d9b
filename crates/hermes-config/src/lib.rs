//! Typed configuration for Hermes.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (preset → files → env), each layer overriding only the
//!   keys it sets
//!
//! [`HermesConfig`] has two sections:
//!
//! - [`DispatchConfig`] - Response encoding and request body limits, bridged
//!   to [`hermes_dispatch::PipelineSettings`]
//! - [`LoggingConfig`] - Log filter and format, bridged to
//!   [`hermes_telemetry::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("hermes.toml")?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! hermes_telemetry::init_logging(&config.logging.to_log_config())?;
//! let settings = config.dispatch.pipeline_settings();
//! # let _ = settings;
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [dispatch]
//! pretty_json = false
//! max_body_bytes = 1048576
//! body_timeout_ms = 30000
//! deny_unknown_fields = true
//!
//! [logging]
//! enabled = true
//! level = "info,hermes_dispatch=debug"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! `PREFIX__SECTION__KEY`, for example:
//!
//! - `HERMES__DISPATCH__MAX_BODY_BYTES=65536`
//! - `HERMES__DISPATCH__BODY_TIMEOUT_MS=none`
//! - `HERMES__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DispatchConfig, LoggingConfig};

pub use hermes_telemetry::LogFormat;
