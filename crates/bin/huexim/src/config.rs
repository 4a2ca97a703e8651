//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `huexim.toml` in the working directory unless a path is given.
//! Every field has a sensible default so the default file is optional.
//! Environment variables take precedence over file values.

use std::path::Path;

use huexim_adapter_hue_cloud::HueCloudConfig;
use serde::Deserialize;

/// Config file read when no path is given.
pub const DEFAULT_PATH: &str = "huexim.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vendor cloud and auth service settings.
    pub hue: HueCloudConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path`, or `huexim.toml` if present, then
    /// apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if an explicitly given
    /// file cannot be read, or if the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path, true)?,
            None => Self::from_file(Path::new(DEFAULT_PATH), false)?,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HUEXIM_API_URL") {
            self.hue.api_base_url = val;
        }
        if let Some(val) = var("HUEXIM_AUTH_URL") {
            self.hue.auth_url = val;
        }
        if let Some(secs) = var("HUEXIM_TIMEOUT_SECS").and_then(|val| val.parse().ok()) {
            self.hue.request_timeout_secs = secs;
        }
        if let Some(val) = var("HUEXIM_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("hue.api_base_url", &self.hue.api_base_url)?;
        check_url("hue.auth_url", &self.hue.auth_url)?;
        if self.hue.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "hue.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_url(name: &str, url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.trim_matches('/').is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "{name} must be an http(s) URL, got {url:?}"
        ))),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "huexim=info,huexim_app=info,huexim_adapter_hue_cloud=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
