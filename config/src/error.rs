use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config file {path} must contain a YAML mapping")]
    NotAMapping { path: PathBuf },

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvValue { name: &'static str, value: String },

    #[error("Failed to expand path {path:?}: {reason}")]
    ExpandPath { path: String, reason: String },
}
