use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CascadeResult;
use crate::types::{Highlighted, OrgId, SettingsDocument, Subject, UserId};

/// Answers which organizations a user belongs to.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Organization memberships of `user`, in no particular order.
    async fn orgs_of(&self, user: UserId) -> CascadeResult<Vec<OrgId>>;
}

/// Read access to the settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The most recent settings document owned by `subject`, if it has one.
    async fn latest_settings(&self, subject: &Subject) -> CascadeResult<Option<SettingsDocument>>;
}

/// Renders source text as highlighted HTML.
#[async_trait]
pub trait Highlighter: Send + Sync {
    async fn render(&self, code: &str, language: &str) -> CascadeResult<Highlighted>;
}

#[async_trait]
impl<P: Directory + ?Sized> Directory for Arc<P> {
    async fn orgs_of(&self, user: UserId) -> CascadeResult<Vec<OrgId>> {
        (**self).orgs_of(user).await
    }
}

#[async_trait]
impl<P: Directory + ?Sized> Directory for Box<P> {
    async fn orgs_of(&self, user: UserId) -> CascadeResult<Vec<OrgId>> {
        (**self).orgs_of(user).await
    }
}

#[async_trait]
impl<P: SettingsStore + ?Sized> SettingsStore for Arc<P> {
    async fn latest_settings(&self, subject: &Subject) -> CascadeResult<Option<SettingsDocument>> {
        (**self).latest_settings(subject).await
    }
}

#[async_trait]
impl<P: SettingsStore + ?Sized> SettingsStore for Box<P> {
    async fn latest_settings(&self, subject: &Subject) -> CascadeResult<Option<SettingsDocument>> {
        (**self).latest_settings(subject).await
    }
}

#[async_trait]
impl<P: Highlighter + ?Sized> Highlighter for Arc<P> {
    async fn render(&self, code: &str, language: &str) -> CascadeResult<Highlighted> {
        (**self).render(code, language).await
    }
}

#[async_trait]
impl<P: Highlighter + ?Sized> Highlighter for Box<P> {
    async fn render(&self, code: &str, language: &str) -> CascadeResult<Highlighted> {
        (**self).render(code, language).await
    }
}
