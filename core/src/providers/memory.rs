use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use cascade_sdk::{CascadeResult, Directory, OrgId, SettingsDocument, SettingsStore, Subject, UserId};
use tokio::sync::RwLock;

/// In-memory organization membership.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    memberships: RwLock<HashMap<UserId, BTreeSet<OrgId>>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_member(&self, user: UserId, org: OrgId) {
        self.memberships
            .write()
            .await
            .entry(user)
            .or_default()
            .insert(org);
    }

    /// Returns whether the user was a member.
    pub async fn remove_member(&self, user: UserId, org: OrgId) -> bool {
        let mut memberships = self.memberships.write().await;
        memberships
            .get_mut(&user)
            .is_some_and(|orgs| orgs.remove(&org))
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn orgs_of(&self, user: UserId) -> CascadeResult<Vec<OrgId>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .get(&user)
            .map(|orgs| orgs.iter().copied().collect())
            .unwrap_or_default())
    }
}

/// In-memory settings store that keeps every version written for a subject.
///
/// Only the latest version is visible through [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    versions: RwLock<HashMap<Subject, Vec<SettingsDocument>>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new version for `subject` and returns its 1-based version number.
    pub async fn put(&self, subject: Subject, contents: impl Into<String>) -> usize {
        let mut versions = self.versions.write().await;
        let history = versions.entry(subject).or_default();
        history.push(SettingsDocument::new(contents));
        tracing::debug!(%subject, version = history.len(), "stored settings");
        history.len()
    }

    pub async fn history(&self, subject: &Subject) -> Vec<SettingsDocument> {
        self.versions
            .read()
            .await
            .get(subject)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn latest_settings(&self, subject: &Subject) -> CascadeResult<Option<SettingsDocument>> {
        let versions = self.versions.read().await;
        Ok(versions.get(subject).and_then(|history| history.last().cloned()))
    }
}
