use std::time::Duration;

use cascade_schema::SchemaError;
use thiserror::Error;

/// Why a settings document could not be turned into a field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCause {
    #[error("unterminated block comment (input ends at line {line} column {column})")]
    MalformedComment { line: usize, column: usize },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("top-level value must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("settings document {document_index} is malformed: {cause}")]
    Parse {
        document_index: usize,
        cause: ParseCause,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("settings store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("highlighter unavailable: {0}")]
    HighlighterUnavailable(String),

    #[error("settings syntax highlighting did not finish within {budget:?}")]
    RenderTimeout { budget: Duration },

    #[error("resolution cancelled")]
    Cancelled,
}

impl CascadeError {
    #[must_use]
    pub const fn parse(document_index: usize, cause: ParseCause) -> Self {
        Self::Parse {
            document_index,
            cause,
        }
    }

    #[must_use]
    pub fn directory_unavailable(reason: impl Into<String>) -> Self {
        Self::DirectoryUnavailable(reason.into())
    }

    #[must_use]
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self::StoreUnavailable(reason.into())
    }

    #[must_use]
    pub fn highlighter_unavailable(reason: impl Into<String>) -> Self {
        Self::HighlighterUnavailable(reason.into())
    }

    #[must_use]
    pub const fn render_timeout(budget: Duration) -> Self {
        Self::RenderTimeout { budget }
    }

    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Failures reported by the directory, the settings store, or the highlighter.
    #[must_use]
    pub const fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::DirectoryUnavailable(_)
                | Self::StoreUnavailable(_)
                | Self::HighlighterUnavailable(_)
        )
    }

    /// Index of the offending document within the folded sequence.
    #[must_use]
    pub const fn document_index(&self) -> Option<usize> {
        match self {
            Self::Parse { document_index, .. } => Some(*document_index),
            _ => None,
        }
    }
}

pub type CascadeResult<T> = Result<T, CascadeError>;
