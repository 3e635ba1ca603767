use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "tagged union type must have a {field:?} property whose value is one of {valid_tags:?} (got {})",
        describe(.value)
    )]
    UnknownDiscriminant {
        field: &'static str,
        value: Option<String>,
        valid_tags: &'static [&'static str],
    },

    #[error("variant {tag:?} must encode to a JSON object")]
    NotAnObject { tag: &'static str },
}

fn describe(value: &Option<String>) -> String {
    value
        .as_ref()
        .map_or_else(|| "no value".to_string(), |v| format!("{v:?}"))
}

impl SchemaError {
    #[must_use]
    pub const fn is_unknown_discriminant(&self) -> bool {
        matches!(self, Self::UnknownDiscriminant { .. })
    }

    /// The discriminant value that failed to match, if one was present.
    #[must_use]
    pub fn attempted_tag(&self) -> Option<&str> {
        match self {
            Self::UnknownDiscriminant { value, .. } => value.as_deref(),
            _ => None,
        }
    }
}

pub type SchemaResult<T> = Result<T, SchemaError>;
