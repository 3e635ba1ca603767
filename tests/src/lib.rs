//! Shared scaffolding for the end-to-end cascade tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cascade_core::{CascadeResolver, MemoryDirectory, MemorySettingsStore};
use cascade_sdk::{CascadeResult, OrgId, SettingsDocument, SettingsStore, Subject, UserId};
use once_cell::sync::OnceCell;

static TRACING: OnceCell<()> = OnceCell::new();

/// Installs a test-writer subscriber once per process. `RUST_LOG` picks the level.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Counts settings fetches passing through to the wrapped store.
pub struct CountingStore<S> {
    inner: S,
    fetches: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SettingsStore> SettingsStore for CountingStore<S> {
    async fn latest_settings(&self, subject: &Subject) -> CascadeResult<Option<SettingsDocument>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.latest_settings(subject).await
    }
}

/// An organization and user population backed by the in-memory collaborators.
pub struct World {
    pub directory: Arc<MemoryDirectory>,
    pub store: Arc<CountingStore<MemorySettingsStore>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        init_tracing();
        Self {
            directory: Arc::new(MemoryDirectory::new()),
            store: Arc::new(CountingStore::new(MemorySettingsStore::new())),
        }
    }

    pub async fn org_settings(&self, org: i32, contents: &str) {
        self.store
            .inner()
            .put(Subject::Organization(OrgId(org)), contents)
            .await;
    }

    pub async fn user_settings(&self, user: i32, contents: &str) {
        self.store.inner().put(Subject::User(UserId(user)), contents).await;
    }

    pub async fn join(&self, user: i32, org: i32) {
        self.directory.add_member(UserId(user), OrgId(org)).await;
    }

    pub fn resolver(&self) -> CascadeResolver {
        CascadeResolver::new(self.directory.clone(), self.store.clone())
    }
}
