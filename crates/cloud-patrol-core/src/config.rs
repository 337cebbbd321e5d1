//! Configuration types for cloud-patrol.

use crate::context::PolicyContext;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for cloud-patrol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset pack to start from (e.g. "aws-defaults", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Values passed through to every policy.
    #[serde(default)]
    pub context: PolicyContext,

    /// Per-policy configurations, keyed by policy name.
    #[serde(default)]
    pub policies: HashMap<String, PolicyConfig>,
}

impl Config {
    /// Reads and parses a config file.
    ///
    /// The raw text is returned alongside, since declarative policy
    /// sections are loaded from it separately.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<(Self, String), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content)?;
        Ok((config, content))
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a policy is enabled.
    #[must_use]
    pub fn is_policy_enabled(&self, policy_name: &str) -> bool {
        self.policies
            .get(policy_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the configuration section for a policy.
    #[must_use]
    pub fn policy(&self, policy_name: &str) -> Option<&PolicyConfig> {
        self.policies.get(policy_name)
    }
}

/// Per-policy configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether this policy is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Policy-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl PolicyConfig {
    /// Deserializes the policy options into a typed settings struct.
    ///
    /// `enabled` is not part of the options; unknown keys are ignored
    /// unless `T` denies them.
    ///
    /// # Errors
    ///
    /// Returns an error if an option has the wrong shape for `T`.
    pub fn options<T: DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        let table: toml::Table = self
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        toml::Value::Table(table).try_into()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
