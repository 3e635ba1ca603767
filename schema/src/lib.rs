//! Cascade Schema
//!
//! Typed records for settings and site configuration documents, and the codec
//! for polymorphic blocks that select their shape through a `"type"`
//! discriminant (authentication providers, extension execution targets).
//!
//! ```
//! use cascade_schema::{decode, AuthProvider};
//!
//! let provider: AuthProvider =
//!     decode(br#"{"type": "http-header", "usernameHeader": "X-User"}"#).unwrap();
//! assert!(matches!(provider, AuthProvider::HttpHeader(_)));
//! ```

#![allow(missing_docs)]

mod auth;
mod error;
mod extension;
mod open;
mod settings;
mod union;

pub use auth::{
    AuthProvider, BuiltinAuthProvider, HttpHeaderAuthProvider, OpenIdConnectAuthProvider,
    SamlAuthProvider,
};
pub use error::{SchemaError, SchemaResult};
pub use extension::{
    DockerTarget, ExecTarget, ExtensionManifest, ExtensionPlatform, TcpTarget, WebSocketTarget,
};
pub use open::{ExtensionSettings, InitializationOptions, InitializationSettings};
pub use settings::{
    ExperimentalFeatures, Langserver, LangserverMetadata, SearchSavedQuery, SearchScope, Settings,
    SiteConfiguration, SlackNotificationsConfig,
};
pub use union::{decode, decode_value, encode, encode_value, json_kind, TaggedUnion};

#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) const fn is_false(value: &bool) -> bool {
    !*value
}
