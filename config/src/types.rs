use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub cascade: CascadeSection,
    pub highlight: HighlightConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeSection {
    /// Top-level settings fields whose arrays concatenate across the cascade.
    pub deep_merge_fields: Vec<String>,
    /// Replaces the built-in default document. `~` and `$VAR` are expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_document: Option<String>,
    /// Maximum settings fetches in flight per resolution. Default: 8.
    pub fetch_concurrency: usize,
}

impl Default for CascadeSection {
    fn default() -> Self {
        Self {
            deep_merge_fields: Vec::new(),
            default_document: None,
            fetch_concurrency: 8,
        }
    }
}

impl CascadeSection {
    pub fn default_document_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        self.default_document
            .as_deref()
            .map(|path| {
                shellexpand::full(path)
                    .map(|expanded| PathBuf::from(expanded.as_ref()))
                    .map_err(|e| ConfigError::ExpandPath {
                        path: path.to_string(),
                        reason: e.to_string(),
                    })
            })
            .transpose()
    }

    #[must_use]
    pub fn effective_fetch_concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Render budget in milliseconds. Default: 3000.
    pub timeout_ms: u64,
    /// Inputs larger than this are not highlighted. Default: 1 MiB.
    pub max_bytes: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            max_bytes: 1024 * 1024,
        }
    }
}

impl HighlightConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Extra `EnvFilter` directives, e.g. `cascade_core=trace`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            filter: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}
