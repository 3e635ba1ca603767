use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::AuthProvider;
use crate::is_false;
use crate::open::ExtensionSettings;

/// Settings owned by a user or an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, ExtensionSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub motd: Vec<String>,
    #[serde(
        rename = "notifications.slack",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub notifications_slack: Option<SlackNotificationsConfig>,
    #[serde(
        rename = "search.repositoryGroups",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub search_repository_groups: BTreeMap<String, Vec<String>>,
    #[serde(
        rename = "search.savedQueries",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub search_saved_queries: Vec<SearchSavedQuery>,
    #[serde(rename = "search.scopes", default, skip_serializing_if = "Vec::is_empty")]
    pub search_scopes: Vec<SearchScope>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackNotificationsConfig {
    #[serde(rename = "webhookURL")]
    pub webhook_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSavedQuery {
    pub key: String,
    pub description: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub notify: bool,
    #[serde(rename = "notifySlack", default, skip_serializing_if = "is_false")]
    pub notify_slack: bool,
    #[serde(rename = "showOnHomepage", default, skip_serializing_if = "is_false")]
    pub show_on_homepage: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchScope {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Site-wide configuration. Only the sections the cascade consumes are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfiguration {
    #[serde(rename = "appURL", default, skip_serializing_if = "String::is_empty")]
    pub app_url: String,
    #[serde(rename = "auth.allowSignup", default, skip_serializing_if = "is_false")]
    pub auth_allow_signup: bool,
    #[serde(rename = "auth.public", default, skip_serializing_if = "is_false")]
    pub auth_public: bool,
    #[serde(rename = "auth.providers", default, skip_serializing_if = "Vec::is_empty")]
    pub auth_providers: Vec<AuthProvider>,
    #[serde(
        rename = "experimentalFeatures",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub experimental_features: Option<ExperimentalFeatures>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langservers: Vec<Langserver>,
    #[serde(rename = "searchScopes", default, skip_serializing_if = "Vec::is_empty")]
    pub search_scopes: Vec<SearchScope>,
    /// Site-level settings, applied beneath every organization and user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl SiteConfiguration {
    /// Whether more than one sign-in method is configured.
    #[must_use]
    pub fn has_multiple_auth_providers(&self) -> bool {
        self.auth_providers.len() > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentalFeatures {
    #[serde(
        rename = "canonicalURLRedirect",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub canonical_url_redirect: String,
    #[serde(rename = "configVars", default, skip_serializing_if = "String::is_empty")]
    pub config_vars: String,
    #[serde(
        rename = "multipleAuthProviders",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub multiple_auth_providers: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Langserver {
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Passed to the language server verbatim.
    #[serde(
        rename = "initializationOptions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub initialization_options: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<LangserverMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangserverMetadata {
    #[serde(rename = "docsURL", default, skip_serializing_if = "String::is_empty")]
    pub docs_url: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub experimental: bool,
    #[serde(rename = "homepageURL", default, skip_serializing_if = "String::is_empty")]
    pub homepage_url: String,
    #[serde(rename = "issuesURL", default, skip_serializing_if = "String::is_empty")]
    pub issues_url: String,
}
