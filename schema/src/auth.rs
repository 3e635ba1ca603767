use serde::{Deserialize, Serialize};

use crate::is_false;

/// Builtin username/password authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinAuthProvider {
    #[serde(rename = "allowSignup", default, skip_serializing_if = "is_false")]
    pub allow_signup: bool,
}

/// SAML single sign-on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamlAuthProvider {
    #[serde(rename = "displayName", default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(
        rename = "identityProviderMetadata",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub identity_provider_metadata: String,
    #[serde(
        rename = "identityProviderMetadataURL",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub identity_provider_metadata_url: String,
    #[serde(
        rename = "insecureSkipAssertionSignatureValidation",
        default,
        skip_serializing_if = "is_false"
    )]
    pub insecure_skip_assertion_signature_validation: bool,
    #[serde(rename = "nameIDFormat", default, skip_serializing_if = "String::is_empty")]
    pub name_id_format: String,
    #[serde(
        rename = "serviceProviderCertificate",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub service_provider_certificate: String,
    #[serde(
        rename = "serviceProviderIssuer",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub service_provider_issuer: String,
    #[serde(
        rename = "serviceProviderPrivateKey",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub service_provider_private_key: String,
    #[serde(rename = "signRequests", default, skip_serializing_if = "Option::is_none")]
    pub sign_requests: Option<bool>,
}

/// OpenID Connect single sign-on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdConnectAuthProvider {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "displayName", default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    pub issuer: String,
    #[serde(
        rename = "requireEmailDomain",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub require_email_domain: String,
}

/// Authentication delegated to a proxy that sets a username header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeaderAuthProvider {
    #[serde(rename = "usernameHeader")]
    pub username_header: String,
}

crate::tagged_union! {
    /// One entry of a site's `auth.providers` list.
    pub enum AuthProvider: "type" {
        "builtin" => Builtin(BuiltinAuthProvider),
        "saml" => Saml(SamlAuthProvider),
        "openidconnect" => OpenIdConnect(OpenIdConnectAuthProvider),
        "http-header" => HttpHeader(HttpHeaderAuthProvider),
    }
}

impl AuthProvider {
    /// The name shown on sign-in buttons, when the provider has one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        let name = match self {
            Self::Saml(p) => &p.display_name,
            Self::OpenIdConnect(p) => &p.display_name,
            Self::Builtin(_) | Self::HttpHeader(_) => return None,
        };
        (!name.is_empty()).then_some(name.as_str())
    }
}
