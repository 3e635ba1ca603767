//! Cascade Core
//!
//! Resolves the settings that apply to an actor by folding the default
//! document, organization documents and the actor's own document, in that
//! order, into one configuration.

#![allow(missing_docs)]

pub mod cascade;
pub mod configuration;
pub mod highlight;
pub mod jsonc;
pub mod merge;
pub mod providers;
pub mod resolver;

pub use cascade::{CascadeResolver, Layer, DEFAULT_FETCH_CONCURRENCY, DEFAULT_SETTINGS};
pub use cascade_sdk;
pub use configuration::Configuration;
pub use highlight::{JsonHighlighter, DEFAULT_MAX_BYTES};
pub use jsonc::from_str_with_comments;
pub use merge::{parse_document, CascadeMerger, DeepMergeFields, MergedConfig};
pub use providers::{MemoryDirectory, MemorySettingsStore};
pub use resolver::SubjectResolver;
pub use tokio_util::sync::CancellationToken;
