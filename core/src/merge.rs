//! The cascade merge engine.
//!
//! Documents are folded in order, earliest first. A later document's field
//! replaces an earlier one ("clobber") unless the field is listed in
//! [`DeepMergeFields`], in which case array values are concatenated across
//! documents instead.

use std::collections::BTreeSet;
use std::sync::Arc;

use cascade_schema::json_kind;
use cascade_sdk::{CascadeError, CascadeResult, ParseCause};
use serde_json::{Map, Value};

use crate::jsonc::from_str_with_comments;

/// Top-level fields whose array values accumulate across the cascade.
///
/// For example, with an org document `{"a":[1]}` and a user document
/// `{"a":[2]}`, the merged value of `a` is `[2]` unless `a` is a deep merge
/// field, in which case it is `[1,2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepMergeFields(BTreeSet<String>);

impl DeepMergeFields {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DeepMergeFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Result of folding a cascade of settings documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    fields: Map<String, Value>,
    deep_merged: Vec<String>,
}

impl MergedConfig {
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Fields whose values were produced by array concatenation, in the
    /// order they were first merged.
    #[must_use]
    pub fn deep_merged(&self) -> &[String] {
        &self.deep_merged
    }

    /// Canonical JSON: compact, keys sorted, no comments.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// Parses one settings document into its top-level fields.
///
/// `document_index` is reported back in any error so callers can tell which
/// level of the cascade was malformed.
pub fn parse_document(document_index: usize, text: &str) -> CascadeResult<Map<String, Value>> {
    match from_str_with_comments::<Value>(text) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(CascadeError::parse(
            document_index,
            ParseCause::NotAnObject(json_kind(&other)),
        )),
        Err(cause) => Err(CascadeError::parse(document_index, cause)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CascadeMerger {
    deep_fields: Arc<DeepMergeFields>,
}

impl CascadeMerger {
    #[must_use]
    pub fn new(deep_fields: DeepMergeFields) -> Self {
        Self {
            deep_fields: Arc::new(deep_fields),
        }
    }

    #[must_use]
    pub fn deep_fields(&self) -> &DeepMergeFields {
        &self.deep_fields
    }

    /// Merges `documents` in order; later documents take precedence.
    pub fn merge<I, D>(&self, documents: I) -> CascadeResult<MergedConfig>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        let mut merged = MergedConfig::default();
        for (index, document) in documents.into_iter().enumerate() {
            let fields = parse_document(index, document.as_ref())?;
            tracing::debug!(document = index, fields = fields.len(), "merging settings document");
            self.fold(&mut merged, fields);
        }
        Ok(merged)
    }

    fn fold(&self, merged: &mut MergedConfig, fields: Map<String, Value>) {
        for (name, value) in fields {
            let value = match value {
                Value::Array(incoming) if self.deep_fields.contains(&name) => {
                    match merged.fields.get_mut(&name) {
                        Some(Value::Array(existing)) => {
                            existing.extend(incoming);
                            note_deep_merge(&mut merged.deep_merged, &name);
                            continue;
                        }
                        None | Some(Value::Null) => {
                            note_deep_merge(&mut merged.deep_merged, &name);
                            Value::Array(incoming)
                        }
                        // Mismatched types degrade to last-write-wins.
                        Some(_) => Value::Array(incoming),
                    }
                }
                other => other,
            };
            merged.fields.insert(name, value);
        }
    }
}

fn note_deep_merge(deep_merged: &mut Vec<String>, name: &str) {
    if !deep_merged.iter().any(|n| n == name) {
        tracing::debug!(field = name, "deep-merging settings field");
        deep_merged.push(name.to_string());
    }
}
