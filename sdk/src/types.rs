use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OrgId(pub i32);

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An entity whose settings document contributes to the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "id", rename_all = "lowercase")
)]
pub enum Subject {
    /// The built-in default document; always the lowest precedence.
    Default,
    #[cfg_attr(feature = "serde", serde(rename = "org"))]
    Organization(OrgId),
    User(UserId),
}

impl Subject {
    #[must_use]
    pub const fn org_id(&self) -> Option<OrgId> {
        match self {
            Self::Organization(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Organization(id) => write!(f, "org:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
        }
    }
}

/// Who is asking. Anonymous actors only ever see the default document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor {
    user: Option<UserId>,
}

impl Actor {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub const fn user(id: UserId) -> Self {
        Self { user: Some(id) }
    }

    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Raw settings text as stored: JSON that may carry `//` and `/* */` comments.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SettingsDocument {
    contents: String,
}

impl SettingsDocument {
    #[must_use]
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    #[must_use]
    pub fn into_contents(self) -> String {
        self.contents
    }
}

impl From<String> for SettingsDocument {
    fn from(contents: String) -> Self {
        Self { contents }
    }
}

impl From<&str> for SettingsDocument {
    fn from(contents: &str) -> Self {
        Self::new(contents)
    }
}

/// Output of a [`Highlighter`](crate::Highlighter).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighted {
    pub html: String,
    /// Set when the highlighter gave up before finishing.
    pub aborted: bool,
}
