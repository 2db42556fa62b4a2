//! Configuration management for the TANF processor
//!
//! Configuration is resolved in layers, each overriding the previous one:
//! built-in defaults, an optional TOML file, `TANF_*` environment variables
//! and finally command-line flags (applied by the CLI).

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_ERROR_BATCH_SIZE, DEFAULT_LOG_LEVEL,
    DEFAULT_RECORD_BATCH_SIZE,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding [`ParserConfig::record_batch_size`]
pub const ENV_RECORD_BATCH_SIZE: &str = "TANF_RECORD_BATCH_SIZE";
/// Environment variable overriding [`ParserConfig::error_batch_size`]
pub const ENV_ERROR_BATCH_SIZE: &str = "TANF_ERROR_BATCH_SIZE";
/// Environment variable overriding [`ParserConfig::ignore_duplicate_error_precedence`]
pub const ENV_IGNORE_PRECEDENCE: &str = "TANF_IGNORE_DUPLICATE_ERROR_PRECEDENCE";
/// Environment variable overriding [`LoggingConfig::level`]
pub const ENV_LOG_LEVEL: &str = "TANF_LOG_LEVEL";

/// Settings passed to every parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Lines parsed between record flushes
    pub record_batch_size: usize,

    /// Buffered errors that trigger an error flush
    pub error_batch_size: usize,

    /// Report every duplicate finding instead of only the strictest per case
    pub ignore_duplicate_error_precedence: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            record_batch_size: DEFAULT_RECORD_BATCH_SIZE,
            error_batch_size: DEFAULT_ERROR_BATCH_SIZE,
            ignore_duplicate_error_precedence: false,
        }
    }
}

impl ParserConfig {
    pub fn with_record_batch_size(mut self, size: usize) -> Self {
        self.record_batch_size = size;
        self
    }

    pub fn with_error_batch_size(mut self, size: usize) -> Self {
        self.error_batch_size = size;
        self
    }

    /// Keep every duplicate finding
    pub fn with_ignored_precedence(mut self, ignore: bool) -> Self {
        self.ignore_duplicate_error_precedence = ignore;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.record_batch_size == 0 {
            return Err(Error::configuration("record_batch_size must be at least 1"));
        }
        if self.error_batch_size == 0 {
            return Err(Error::configuration("error_batch_size must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the `tanf_processor` target when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Global configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parsing: ParserConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the TOML file, then the environment
    ///
    /// An explicit path must exist; the default path is only read when present.
    pub fn load_layered(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TANF_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_RECORD_BATCH_SIZE) {
            self.parsing.record_batch_size = parse_env(ENV_RECORD_BATCH_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_ERROR_BATCH_SIZE) {
            self.parsing.error_batch_size = parse_env(ENV_ERROR_BATCH_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_IGNORE_PRECEDENCE) {
            self.parsing.ignore_duplicate_error_precedence =
                parse_env(ENV_IGNORE_PRECEDENCE, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = value.trim().to_string();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.parsing.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(Error::configuration("logging level must not be empty"));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid value '{}' for {}", value, key)))
}
