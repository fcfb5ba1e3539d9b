//! Layered configuration loading.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, HermesConfig};

/// Configuration loader with layered approach.
///
/// Layers are applied in order, later ones overriding earlier ones:
/// 1. Defaults or a preset
/// 2. Configuration files or strings (TOML or JSON), key by key
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// A file only overrides the keys it sets, so a partial file on top of a
/// preset keeps the rest of the preset.
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_production()
///     .with_optional_file("hermes.toml")?
///     .with_dotenv()?
///     .with_env_prefix("HERMES")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HermesConfig::default(),
            env_prefix: None,
        }
    }

    /// Resets to the default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HermesConfig::default();
        self
    }

    /// Starts from the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HermesConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HermesConfig::production();
        self
    }

    /// Loads a configuration file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist or cannot be read
    /// - The extension is neither `toml` nor `json`
    /// - The content does not parse or has unknown fields
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;

        self.with_string(&content, &format)
    }

    /// Loads a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the given format
    /// (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown, the content does not
    /// parse, or it has unknown fields.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [dispatch]
    ///     pretty_json = true
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.dispatch.pretty_json);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => {
                // Full parse first so unknown fields surface as TOML errors.
                toml::from_str::<HermesConfig>(content)?;
                let table: toml::Table = toml::from_str(content)?;
                serde_json::to_value(table)?
            }
            "json" => {
                serde_json::from_str::<HermesConfig>(content)?;
                serde_json::from_str(content)?
            }
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;

        Ok(self)
    }

    /// Sets the environment variable prefix for overrides.
    ///
    /// With prefix `HERMES`:
    /// - `HERMES__DISPATCH__PRETTY_JSON=true`
    /// - `HERMES__DISPATCH__BODY_TIMEOUT_MS=none`
    /// - `HERMES__LOGGING__LEVEL=hermes_dispatch=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` from the current directory or its parents into the
    /// process environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads a specific env file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn with_dotenv_path<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Returns the configuration without env overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HermesConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let section_prefix = format!("{prefix}__");
        let env_vars: BTreeMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(&section_prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::invalid_env(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["DISPATCH", "PRETTY_JSON"] => {
                self.config.dispatch.pretty_json = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }
            ["DISPATCH", "MAX_BODY_BYTES"] => {
                self.config.dispatch.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::invalid_env(key, "expected integer"))?;
            }
            ["DISPATCH", "BODY_TIMEOUT_MS"] => {
                self.config.dispatch.body_timeout_ms =
                    if value.is_empty() || value.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        Some(value.parse().map_err(|_| {
                            ConfigError::invalid_env(key, "expected integer or 'none'")
                        })?)
                    };
            }
            ["DISPATCH", "DENY_UNKNOWN_FIELDS"] => {
                self.config.dispatch.deny_unknown_fields = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse()
                    .map_err(|_| ConfigError::invalid_env(key, "expected 'json' or 'pretty'"))?;
            }

            // Unknown keys are ignored so unrelated settings can share the prefix.
            _ => {}
        }

        Ok(())
    }
}

/// Overlays `layer` onto `base`, recursing into objects.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_telemetry::LogFormat;
    use serde_json::json;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HermesConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);

        let config = ConfigLoader::new()
            .with_development()
            .with_defaults()
            .load()
            .unwrap();
        assert_eq!(config, HermesConfig::default());
    }

    #[test]
    fn test_with_string_toml() {
        let toml = r#"
            [dispatch]
            max_body_bytes = 4096
            body_timeout_ms = 1500

            [logging]
            format = "pretty"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.dispatch.max_body_bytes, 4096);
        assert_eq!(config.dispatch.body_timeout_ms, Some(1500));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_with_string_json() {
        let json = r#"{"dispatch": {"deny_unknown_fields": true}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "JSON")
            .unwrap()
            .load()
            .unwrap();

        assert!(config.dispatch.deny_unknown_fields);
    }

    #[test]
    fn test_partial_layer_keeps_preset() {
        let config = ConfigLoader::new()
            .with_development()
            .with_string("[logging]\nlevel = \"trace\"\n", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.logging.level, "trace");
        // Untouched preset values survive.
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.dispatch.pretty_json);
    }

    #[test]
    fn test_later_layers_win() {
        let config = ConfigLoader::new()
            .with_string(r#"{"dispatch": {"max_body_bytes": 10}}"#, "json")
            .unwrap()
            .with_string("[dispatch]\nmax_body_bytes = 20\n", "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.dispatch.max_body_bytes, 20);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::new().with_string("[dispatch]\ncompression = true\n", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));

        let result = ConfigLoader::new().with_string(r#"{"routes": []}"#, "json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigLoader::new().with_string("dispatch: {}", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(f)) if f == "yaml"));
    }

    #[test]
    fn test_with_file_toml() {
        let file = write_temp(".toml", "[dispatch]\npretty_json = true\n");

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert!(config.dispatch.pretty_json);
    }

    #[test]
    fn test_with_file_json() {
        let file = write_temp(".json", r#"{"logging": {"enabled": false}}"#);

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_with_file_unknown_extension() {
        let file = write_temp(".ini", "pretty_json=true");
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/hermes.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/hermes.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config, HermesConfig::default());
    }

    #[test]
    fn test_with_dotenv_path_missing() {
        let result = ConfigLoader::new().with_dotenv_path("/nonexistent/.env");
        assert!(matches!(result, Err(ConfigError::Dotenv(_))));
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[dispatch]\nmax_body_bytes = 0\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_unvalidated() {
        let config = ConfigLoader::new()
            .with_string("[dispatch]\nmax_body_bytes = 0\n", "toml")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.dispatch.max_body_bytes, 0);
    }

    // Overrides are tested through apply_env_var; mutating the process
    // environment would race with other tests.

    #[test]
    fn test_apply_env_var_dispatch() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__DISPATCH__PRETTY_JSON", "yes", "TEST").unwrap();
        loader.apply_env_var("TEST__DISPATCH__MAX_BODY_BYTES", "512", "TEST").unwrap();
        loader.apply_env_var("TEST__DISPATCH__BODY_TIMEOUT_MS", "100", "TEST").unwrap();
        loader.apply_env_var("TEST__DISPATCH__DENY_UNKNOWN_FIELDS", "on", "TEST").unwrap();

        assert!(loader.config.dispatch.pretty_json);
        assert_eq!(loader.config.dispatch.max_body_bytes, 512);
        assert_eq!(loader.config.dispatch.body_timeout_ms, Some(100));
        assert!(loader.config.dispatch.deny_unknown_fields);

        loader.apply_env_var("TEST__DISPATCH__BODY_TIMEOUT_MS", "none", "TEST").unwrap();
        assert_eq!(loader.config.dispatch.body_timeout_ms, None);
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__LOGGING__LEVEL", "hermes_dispatch=debug", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "Pretty", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__ENABLED", "0", "TEST").unwrap();

        assert_eq!(loader.config.logging.level, "hermes_dispatch=debug");
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert!(!loader.config.logging.enabled);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__DISPATCH__MAX_BODY_BYTES", "lots", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__DISPATCH__PRETTY_JSON", "maybe", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__PORT", "8080", "TEST").unwrap();
        assert_eq!(loader.config, HermesConfig::default());
    }

    #[test]
    fn test_merge_values() {
        let mut base = json!({"dispatch": {"a": 1, "b": 2}, "logging": {"level": "info"}});
        merge_values(&mut base, json!({"dispatch": {"b": 3}}));
        assert_eq!(
            base,
            json!({"dispatch": {"a": 1, "b": 3}, "logging": {"level": "info"}})
        );
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }
}
