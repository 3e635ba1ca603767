//! Cascade Configuration
//!
//! YAML configuration for the settings cascade: which fields deep-merge,
//! the default document, fetch fan-out, highlighting limits and logging.
//!
//! # Configuration Loading Priority
//!
//! 1. Compiled-in defaults
//! 2. `/etc/cascade/cascade.yaml` (system-wide)
//! 3. `~/.config/cascade/cascade.yaml` (user)
//! 4. `./cascade.yaml` (project-local)
//! 5. An explicit file, or `CASCADE_CONFIG=/path/to/cascade.yaml`
//! 6. Environment variables (highest priority)
//!
//! # Example Configuration
//!
//! ```yaml
//! cascade:
//!   deep_merge_fields: [motd, search.scopes]
//!   default_document: "~/.config/cascade/default.json"
//!   fetch_concurrency: 8
//!
//! highlight:
//!   timeout_ms: 3000
//!
//! logging:
//!   level: "${CASCADE_LEVEL}"
//!   format: compact
//! ```

#![allow(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{ConfigLoader, CONFIG_ENV};
pub use types::*;

/// Load configuration from default locations.
///
/// Searches for config files in order and merges them.
/// Environment variables override file values.
pub fn load() -> Result<CascadeConfig, ConfigError> {
    ConfigLoader::new().load()
}

/// Load configuration with `path` layered above the default locations.
pub fn load_from_file(path: impl Into<std::path::PathBuf>) -> Result<CascadeConfig, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}
