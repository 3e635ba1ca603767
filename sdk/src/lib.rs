//! Cascade SDK
//!
//! Shared vocabulary for settings cascade resolution: subjects and actors,
//! raw settings documents, the collaborator traits the resolver reads through
//! (directory, settings store, highlighter), and the error type.

mod error;
mod provider;
mod types;

pub use cascade_schema as schema;
pub use error::{CascadeError, CascadeResult, ParseCause};
pub use provider::{Directory, Highlighter, SettingsStore};
pub use types::{Actor, Highlighted, OrgId, SettingsDocument, Subject, UserId};
