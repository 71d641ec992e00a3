use thiserror::Error;

/// Failure to load or validate a [`crate::RegistryConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{setting} must be private, protected or public, got '{value}'")]
    UnknownVisibility { setting: String, value: String },

    #[error("registry label must not be blank when set")]
    BlankLabel,

    #[error("{key} is set but is not valid unicode")]
    NonUnicodeEnv { key: String },

    #[error("malformed YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn unknown_visibility(setting: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownVisibility {
            setting: setting.into(),
            value: value.into(),
        }
    }
}
