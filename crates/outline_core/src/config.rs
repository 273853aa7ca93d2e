//! Outline runtime configuration.
//!
//! # Responsibility
//! - Describe tunables of the outline core and its logging bootstrap.
//! - Load them from JSON with every field optional.
//!
//! # Invariants
//! - A validated config has a non-blank default headline.
//! - `log_dir`, when set, is an absolute path.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Headline given to nodes created without an explicit title.
pub const DEFAULT_HEADLINE: &str = "newHeadline";

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config text is not valid JSON for `OutlineConfig`.
    Parse(serde_json::Error),
    /// Config parsed but violates an invariant.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Tunables of one outline session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Headline of nodes created by `insert_new_child` and friends.
    pub default_headline: String,
    /// Log level passed to `init_logging`.
    pub log_level: String,
    /// Absolute log directory. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            default_headline: DEFAULT_HEADLINE.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl OutlineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: OutlineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_headline.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_headline must not be blank".to_string(),
            ));
        }
        if self.default_headline.contains(['\n', '\r']) {
            return Err(ConfigError::Invalid(
                "default_headline must be a single line".to_string(),
            ));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
