use std::time::Duration;

use cascade_core::{CancellationToken, JsonHighlighter, DEFAULT_SETTINGS};
use cascade_schema::{
    decode, encode, AuthProvider, ExtensionManifest, ExtensionPlatform, InitializationOptions,
    InitializationSettings, Settings, SiteConfiguration,
};
use cascade_sdk::{Actor, CascadeError, OrgId, ParseCause, Subject, UserId};
use cascade_tests::World;
use serde_json::{json, Value};

const ALICE: i32 = 10;

async fn engineering_world() -> World {
    let world = World::new();
    world.join(ALICE, 3).await;
    world.join(ALICE, 1).await;

    world
        .org_settings(
            1,
            r#"// company-wide
{
  "motd": ["Welcome to Acme"],
  "search.scopes": [{"id": "acme", "name": "Acme", "value": "repo:^acme/"}],
  "extensions": {"acme/lint": {"disabled": false, "level": "strict"}}
}"#,
        )
        .await;
    world
        .org_settings(
            3,
            r#"{
  /* engineering */
  "motd": ["Deploy freeze on Fridays"],
  "notifications.slack": {"webhookURL": "https://hooks.example.com/eng"}
}"#,
        )
        .await;
    world
        .user_settings(
            ALICE,
            r#"{"motd": ["Hi Alice"], "extensions": {"acme/lint": {"disabled": true}}}"#,
        )
        .await;
    world
}

#[tokio::test]
async fn org_and_user_settings_cascade() {
    let world = engineering_world().await;
    let resolver = world.resolver();
    let actor = Actor::user(UserId(ALICE));
    let cancel = CancellationToken::new();

    assert_eq!(
        resolver.subjects(&actor, &cancel).await.unwrap(),
        vec![
            Subject::Organization(OrgId(1)),
            Subject::Organization(OrgId(3)),
            Subject::User(UserId(ALICE)),
        ]
    );

    let merged = resolver.merged(&actor, &cancel).await.unwrap();
    let settings: Settings = merged.decode().unwrap();

    assert_eq!(settings.motd, vec!["Hi Alice".to_string()]);
    assert!(settings.extensions["acme/lint"].disabled);
    // The user's extensions object replaced the org's wholesale.
    assert!(settings.extensions["acme/lint"].additional.is_empty());
    assert_eq!(settings.search_scopes.len(), 1);
    assert_eq!(
        settings.notifications_slack.unwrap().webhook_url,
        "https://hooks.example.com/eng"
    );
}

#[tokio::test]
async fn deep_merge_fields_accumulate_across_subjects() {
    let world = engineering_world().await;
    let resolver = world
        .resolver()
        .with_deep_merge_fields(["motd", "search.scopes"].into_iter().collect());

    let merged = resolver
        .merged(&Actor::user(UserId(ALICE)), &CancellationToken::new())
        .await
        .unwrap();
    let fields = merged.fields().unwrap();

    assert_eq!(
        fields["motd"],
        json!(["Welcome to Acme", "Deploy freeze on Fridays", "Hi Alice"])
    );
    assert_eq!(merged.deep_merged(), ["motd", "search.scopes"]);
}

#[tokio::test]
async fn anonymous_actor_sees_only_defaults() {
    let world = engineering_world().await;
    let resolver = world.resolver();
    let cancel = CancellationToken::new();

    assert!(resolver
        .subjects(&Actor::anonymous(), &cancel)
        .await
        .unwrap()
        .is_empty());

    let merged = resolver.merged(&Actor::anonymous(), &cancel).await.unwrap();
    assert_eq!(merged.fields().unwrap(), resolver.defaults().fields().unwrap());
    assert_eq!(resolver.defaults().contents(), DEFAULT_SETTINGS);
    assert_eq!(world.store.fetches(), 0);
}

#[tokio::test]
async fn every_resolution_reads_the_latest_settings() {
    let world = engineering_world().await;
    let resolver = world.resolver();
    let actor = Actor::user(UserId(ALICE));
    let cancel = CancellationToken::new();

    let before = resolver.merged(&actor, &cancel).await.unwrap();
    assert_eq!(world.store.fetches(), 3);

    world.user_settings(ALICE, r#"{"motd": ["Edited"]}"#).await;
    let after = resolver.merged(&actor, &cancel).await.unwrap();
    assert_eq!(world.store.fetches(), 6);

    assert_ne!(before, after);
    assert_eq!(after.fields().unwrap()["motd"], json!(["Edited"]));
}

#[tokio::test]
async fn malformed_org_settings_are_attributed() {
    let world = engineering_world().await;
    world.org_settings(3, "{\"motd\": [] /* unterminated").await;
    let resolver = world.resolver();
    let actor = Actor::user(UserId(ALICE));
    let cancel = CancellationToken::new();

    let err = resolver.merged(&actor, &cancel).await.unwrap_err();
    let (document_index, cause) = match err {
        CascadeError::Parse {
            document_index,
            cause,
        } => (document_index, cause),
        other => panic!("expected a parse error, got {other:?}"),
    };
    assert!(matches!(cause, ParseCause::MalformedComment { .. }));

    let layers = resolver.layers(&actor, &cancel).await.unwrap();
    assert_eq!(layers[document_index].subject, Subject::Organization(OrgId(3)));
}

#[tokio::test]
async fn merged_settings_render_as_html() {
    let world = engineering_world().await;
    let resolver = world.resolver();
    let cancel = CancellationToken::new();

    let merged = resolver
        .merged(&Actor::user(UserId(ALICE)), &cancel)
        .await
        .unwrap();
    let html = merged
        .highlighted(&JsonHighlighter::new(), Duration::from_secs(3), &cancel)
        .await
        .unwrap();
    assert!(html.contains(r#"<span class="hl-key">&quot;motd&quot;</span>"#));
    assert!(html.contains(r#"<span class="hl-string">&quot;Hi Alice&quot;</span>"#));

    let err = merged
        .highlighted(
            &JsonHighlighter::new().with_max_bytes(8),
            Duration::from_secs(3),
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CascadeError::RenderTimeout { .. }));
}

#[tokio::test]
async fn defaults_render_with_comments() {
    let world = World::new();
    let html = world
        .resolver()
        .defaults()
        .highlighted(
            &JsonHighlighter::new(),
            Duration::from_secs(3),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(html.contains(r#"<span class="hl-comment">/* default configuration is empty */</span>"#));
}

#[test]
fn site_configuration_auth_providers() {
    let site: SiteConfiguration = serde_json::from_str(
        r#"{
            "appURL": "https://cascade.example.com",
            "auth.providers": [
                {"type": "builtin", "allowSignup": true},
                {"type": "openidconnect", "issuer": "https://id.example.com", "clientID": "abc", "clientSecret": "s3cret", "displayName": "Example ID"},
                {"type": "saml", "identityProviderMetadataURL": "https://idp.example.com/metadata"},
                {"type": "http-header", "usernameHeader": "X-Forwarded-User"}
            ]
        }"#,
    )
    .unwrap();

    assert!(site.has_multiple_auth_providers());
    let tags: Vec<&str> = site
        .auth_providers
        .iter()
        .map(|provider| match provider {
            AuthProvider::Builtin(_) => "builtin",
            AuthProvider::OpenIdConnect(_) => "openidconnect",
            AuthProvider::Saml(_) => "saml",
            AuthProvider::HttpHeader(_) => "http-header",
        })
        .collect();
    assert_eq!(tags, ["builtin", "openidconnect", "saml", "http-header"]);

    let reparsed: SiteConfiguration =
        serde_json::from_value(serde_json::to_value(&site).unwrap()).unwrap();
    assert_eq!(reparsed, site);
}

#[test]
fn unknown_auth_provider_lists_valid_tags() {
    let err = decode::<AuthProvider>(br#"{"type": "bogus"}"#).unwrap_err();
    assert_eq!(err.attempted_tag(), Some("bogus"));

    let message = err.to_string();
    for tag in ["builtin", "saml", "openidconnect", "http-header"] {
        assert!(message.contains(tag), "{message} should list {tag}");
    }
}

#[test]
fn extension_manifest_round_trip() {
    let text = r#"{
        "title": "Acme Lint",
        "activationEvents": ["*"],
        "platform": {"type": "docker", "image": "acme/lint:1.2"}
    }"#;
    let manifest: ExtensionManifest = serde_json::from_str(text).unwrap();
    assert!(matches!(manifest.platform, ExtensionPlatform::Docker(ref d) if d.image == "acme/lint:1.2"));

    let encoded = serde_json::to_value(&manifest).unwrap();
    assert_eq!(
        encoded["platform"],
        json!({"type": "docker", "image": "acme/lint:1.2"})
    );

    let platform_bytes = encode(&manifest.platform).unwrap();
    let platform: ExtensionPlatform = decode(&platform_bytes).unwrap();
    assert_eq!(platform, manifest.platform);
}

#[tokio::test]
async fn merged_settings_feed_extension_initialization() {
    let world = engineering_world().await;
    let merged = world
        .resolver()
        .merged(&Actor::user(UserId(ALICE)), &CancellationToken::new())
        .await
        .unwrap();

    let mut other = serde_json::Map::new();
    other.insert("trace".to_string(), json!("off"));
    let options = InitializationOptions {
        settings: InitializationSettings {
            merged: Some(Value::Object(merged.fields().unwrap())),
        },
        other,
    };

    let encoded = serde_json::to_value(&options).unwrap();
    assert_eq!(encoded["trace"], json!("off"));
    assert_eq!(encoded["settings"]["merged"]["motd"], json!(["Hi Alice"]));

    let decoded: InitializationOptions = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, options);
}
