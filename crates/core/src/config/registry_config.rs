use crate::config::ConfigError;
use crate::exports::Visibility;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable holding the registry label
pub const LABEL_ENV: &str = "SWITCHBOARD_LABEL";
/// Environment variable holding the default export visibility
pub const DEFAULT_VISIBILITY_ENV: &str = "SWITCHBOARD_DEFAULT_VISIBILITY";

/// Settings a registry is constructed with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Human-readable name used in place of the registry id in error reports
    pub label: Option<String>,
    /// Visibility of accessors exported from a plain list specification
    pub default_visibility: Visibility,
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default_visibility(mut self, visibility: Visibility) -> Self {
        self.default_visibility = visibility;
        self
    }

    /// Load configuration from environment variables; unset variables keep
    /// their defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(label) = read_env(LABEL_ENV)? {
            config.label = Some(label);
        }

        if let Some(visibility) = read_env(DEFAULT_VISIBILITY_ENV)? {
            config.default_visibility = visibility
                .parse()
                .map_err(|_| ConfigError::unknown_visibility(DEFAULT_VISIBILITY_ENV, visibility.as_str()))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(ConfigError::BlankLabel);
            }
        }
        Ok(())
    }
}

fn read_env(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicodeEnv {
            key: key.to_string(),
        }),
    }
}
