use std::future::Future;
use std::sync::Arc;

use cascade_sdk::{
    Actor, CascadeError, CascadeResult, Directory, SettingsDocument, SettingsStore, Subject,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::configuration::Configuration;
use crate::merge::{CascadeMerger, DeepMergeFields};
use crate::resolver::SubjectResolver;

/// Lowest-precedence document of every cascade.
pub const DEFAULT_SETTINGS: &str = "// This is the default configuration. Override it with org or user settings.
{
  /* default configuration is empty */
}";

pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// One document folded into a resolution, with the subject that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub subject: Subject,
    pub document: SettingsDocument,
}

/// Resolves the merged settings that apply to an actor.
///
/// The cascade is the default document, then each organization the actor
/// belongs to (ascending id), then the actor's own settings. Documents are
/// fetched concurrently but always folded in cascade order.
pub struct CascadeResolver {
    subjects: SubjectResolver,
    store: Arc<dyn SettingsStore>,
    merger: CascadeMerger,
    default_document: SettingsDocument,
    fetch_concurrency: usize,
}

impl std::fmt::Debug for CascadeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeResolver")
            .field("deep_fields", self.merger.deep_fields())
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish_non_exhaustive()
    }
}

impl CascadeResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn Directory>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            subjects: SubjectResolver::new(directory),
            store,
            merger: CascadeMerger::default(),
            default_document: SettingsDocument::new(DEFAULT_SETTINGS),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_deep_merge_fields(mut self, fields: DeepMergeFields) -> Self {
        self.merger = CascadeMerger::new(fields);
        self
    }

    #[must_use]
    pub fn with_default_document(mut self, document: impl Into<SettingsDocument>) -> Self {
        self.default_document = document.into();
        self
    }

    /// Limits in-flight settings fetches. Zero is treated as one.
    #[must_use]
    pub fn with_fetch_concurrency(mut self, limit: usize) -> Self {
        self.fetch_concurrency = limit.max(1);
        self
    }

    #[must_use]
    pub const fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    #[must_use]
    pub fn deep_merge_fields(&self) -> &DeepMergeFields {
        self.merger.deep_fields()
    }

    /// The default document, unmerged and with its comments intact.
    #[must_use]
    pub fn defaults(&self) -> Configuration {
        Configuration::new(self.default_document.contents())
    }

    pub async fn subjects(
        &self,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> CascadeResult<Vec<Subject>> {
        cancellable(cancel, "subjects", self.subjects.resolve(actor)).await
    }

    /// The documents a resolution folds, lowest precedence first.
    ///
    /// Subjects without a stored document are skipped, so positions here
    /// match the `document_index` of a parse error from [`Self::merged`].
    pub async fn layers(&self, actor: &Actor, cancel: &CancellationToken) -> CascadeResult<Vec<Layer>> {
        let subjects = self.subjects(actor, cancel).await?;
        self.fetch_layers(&subjects, cancel).await
    }

    /// Fetches the documents of already resolved `subjects`, with the
    /// default document first.
    pub async fn fetch_layers(
        &self,
        subjects: &[Subject],
        cancel: &CancellationToken,
    ) -> CascadeResult<Vec<Layer>> {
        let store = &self.store;
        let fetch = stream::iter(subjects.iter().copied())
            .map(|subject| async move { store.latest_settings(&subject).await })
            .buffered(self.fetch_concurrency)
            .try_collect::<Vec<_>>();
        let documents = cancellable(cancel, "fetch", fetch).await?;

        let mut layers = Vec::with_capacity(subjects.len() + 1);
        layers.push(Layer {
            subject: Subject::Default,
            document: self.default_document.clone(),
        });
        layers.extend(
            subjects
                .iter()
                .copied()
                .zip(documents)
                .filter_map(|(subject, document)| document.map(|document| Layer { subject, document })),
        );
        Ok(layers)
    }

    pub async fn merged(&self, actor: &Actor, cancel: &CancellationToken) -> CascadeResult<Configuration> {
        let layers = self.layers(actor, cancel).await?;
        if cancel.is_cancelled() {
            return Err(CascadeError::Cancelled);
        }
        self.fold(actor, &layers)
    }

    /// Merges layers produced by [`Self::layers`] or [`Self::fetch_layers`].
    pub fn fold(&self, actor: &Actor, layers: &[Layer]) -> CascadeResult<Configuration> {
        let merged = self
            .merger
            .merge(layers.iter().map(|layer| layer.document.contents()))?;

        tracing::info!(
            user = ?actor.user_id(),
            layers = layers.len(),
            fields = merged.fields().len(),
            deep_merged = merged.deep_merged().len(),
            "resolved settings cascade"
        );
        Ok(Configuration::from_merged(&merged))
    }
}

/// Runs `operation` unless `cancel` fires first.
pub(crate) async fn cancellable<F, T>(
    cancel: &CancellationToken,
    stage: &'static str,
    operation: F,
) -> CascadeResult<T>
where
    F: Future<Output = CascadeResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::warn!(stage, "settings cascade cancelled");
            Err(CascadeError::Cancelled)
        }
        result = operation => result,
    }
}
