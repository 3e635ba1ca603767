use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::{CascadeConfig, ConfigError, LogLevel};

pub const CONFIG_ENV: &str = "CASCADE_CONFIG";

static ENV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env reference pattern is valid"));

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        #[cfg(unix)]
        search_paths.push(PathBuf::from("/etc/cascade/cascade.yaml"));

        if let Some(config_dir) = dirs::home_dir() {
            search_paths.push(config_dir.join(".config/cascade/cascade.yaml"));
        }
        search_paths.push(PathBuf::from("./cascade.yaml"));

        Self {
            explicit_file: None,
            search_paths,
        }
    }

    /// Layers `path` above every searched file. It must exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Replaces the default search locations, lowest precedence first.
    #[must_use]
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn load(&self) -> Result<CascadeConfig, ConfigError> {
        let mut merged = Value::Mapping(Mapping::new());

        for path in &self.search_paths {
            if path.is_file() {
                merge_yaml(&mut merged, read_layer(path)?);
                tracing::debug!(path = %path.display(), "loaded config layer");
            }
        }

        let explicit = self
            .explicit_file
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = explicit {
            merge_yaml(&mut merged, read_layer(&path)?);
            tracing::debug!(path = %path.display(), "loaded explicit config");
        }

        let mut config: CascadeConfig = serde_yaml::from_value(merged)?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }
}

fn read_layer(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    match serde_yaml::from_str::<Value>(&expand_env_vars(&content))? {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        layer @ Value::Mapping(_) => Ok(layer),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Nested mappings merge key by key; anything else is replaced.
fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

fn expand_env_vars(content: &str) -> String {
    ENV_REFERENCE
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

fn apply_env_overrides(
    config: &mut CascadeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(fields) = lookup("CASCADE_DEEP_MERGE_FIELDS") {
        config.cascade.deep_merge_fields = fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(document) = lookup("CASCADE_DEFAULT_DOCUMENT") {
        if !document.is_empty() {
            config.cascade.default_document = Some(document);
        }
    }
    if let Some(value) = lookup("CASCADE_FETCH_CONCURRENCY") {
        config.cascade.fetch_concurrency = parse_env("CASCADE_FETCH_CONCURRENCY", value)?;
    }
    if let Some(value) = lookup("CASCADE_HIGHLIGHT_TIMEOUT_MS") {
        config.highlight.timeout_ms = parse_env("CASCADE_HIGHLIGHT_TIMEOUT_MS", value)?;
    }
    if let Some(level) = lookup("CASCADE_LOG_LEVEL") {
        config.logging.level = serde_yaml::from_str::<LogLevel>(&level.to_ascii_lowercase())
            .map_err(|_| ConfigError::InvalidEnvValue {
                name: "CASCADE_LOG_LEVEL",
                value: level,
            })?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue { name, value })
}
