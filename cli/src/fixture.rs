//! YAML fixtures describing organizations, users and their settings.
//!
//! ```yaml
//! orgs:
//!   1: '{"motd": ["from org 1"]}'
//! users:
//!   7:
//!     orgs: [1]
//!     settings: |
//!       // personal overrides
//!       {"motd": ["mine"]}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use cascade_core::{MemoryDirectory, MemorySettingsStore};
use cascade_sdk::{OrgId, Subject, UserId};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub orgs: BTreeMap<i32, String>,
    pub users: BTreeMap<i32, FixtureUser>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureUser {
    pub orgs: Vec<i32>,
    pub settings: Option<String>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read fixture {}: {e}", path.display()))?;
        Self::parse(&text).map_err(|e| format!("Invalid fixture {}: {e}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub async fn into_providers(self) -> (MemoryDirectory, MemorySettingsStore) {
        let directory = MemoryDirectory::new();
        let store = MemorySettingsStore::new();

        for (id, settings) in self.orgs {
            store.put(Subject::Organization(OrgId(id)), settings).await;
        }
        for (id, user) in self.users {
            for org in user.orgs {
                directory.add_member(UserId(id), OrgId(org)).await;
            }
            if let Some(settings) = user.settings {
                store.put(Subject::User(UserId(id)), settings).await;
            }
        }

        (directory, store)
    }
}
