use std::time::{Duration, Instant};

use cascade_sdk::{CascadeError, CascadeResult, Highlighter};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::cascade::cancellable;
use crate::merge::{parse_document, MergedConfig};

/// A settings configuration as presented to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    contents: String,
    deep_merged: Vec<String>,
}

impl Configuration {
    #[must_use]
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            deep_merged: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_merged(merged: &MergedConfig) -> Self {
        Self {
            contents: merged.to_json_string(),
            deep_merged: merged.deep_merged().to_vec(),
        }
    }

    /// Raw JSON text. Comments survive only in unmerged documents.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    #[must_use]
    pub fn deep_merged(&self) -> &[String] {
        &self.deep_merged
    }

    pub fn fields(&self) -> CascadeResult<Map<String, Value>> {
        parse_document(0, &self.contents)
    }

    /// Indented JSON with sorted keys.
    pub fn pretty(&self) -> CascadeResult<String> {
        Ok(format!("{:#}", Value::Object(self.fields()?)))
    }

    /// Decodes the contents into a typed settings record.
    pub fn decode<T: DeserializeOwned>(&self) -> CascadeResult<T> {
        let fields = self.fields()?;
        serde_json::from_value(Value::Object(fields)).map_err(|e| CascadeError::Schema(e.into()))
    }

    /// Renders the contents as highlighted HTML.
    ///
    /// Fails with [`CascadeError::RenderTimeout`] when `budget` elapses or the
    /// highlighter gives up on its own. A render that finishes synchronously
    /// but took longer than `budget` is a timeout as well.
    pub async fn highlighted(
        &self,
        highlighter: &dyn Highlighter,
        budget: Duration,
        cancel: &CancellationToken,
    ) -> CascadeResult<String> {
        let started = Instant::now();
        let render = async {
            match tokio::time::timeout(budget, highlighter.render(&self.contents, "json")).await {
                Ok(result) => result,
                Err(_) => Err(CascadeError::render_timeout(budget)),
            }
        };
        let highlighted = cancellable(cancel, "render", render).await?;
        let elapsed = started.elapsed();

        if highlighted.aborted || elapsed > budget {
            tracing::warn!(
                bytes = self.contents.len(),
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                aborted = highlighted.aborted,
                "highlighting exceeded its budget"
            );
            return Err(CascadeError::render_timeout(budget));
        }
        Ok(highlighted.html)
    }
}
