use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Runs a Docker container that provides the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerTarget {
    pub image: String,
}

/// Runs a local executable and talks to it over stdin/stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecTarget {
    pub command: String,
}

/// Connects to an existing TCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpTarget {
    pub address: String,
}

/// Connects to an existing WebSocket endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketTarget {
    pub url: String,
}

crate::tagged_union! {
    /// Where an extension's functionality is executed.
    pub enum ExtensionPlatform: "type" {
        "docker" => Docker(DockerTarget),
        "exec" => Exec(ExecTarget),
        "tcp" => Tcp(TcpTarget),
        "websocket" => WebSocket(WebSocketTarget),
    }
}

impl ExtensionPlatform {
    /// Whether the target is reached over the network rather than spawned locally.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Tcp(_) | Self::WebSocket(_))
    }
}

/// An extension's manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "activationEvents")]
    pub activation_events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    pub platform: ExtensionPlatform,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, encode, SchemaError};

    #[test]
    fn every_target_round_trips() {
        let targets = [
            ExtensionPlatform::Docker(DockerTarget {
                image: "example/ext:1.0".to_string(),
            }),
            ExtensionPlatform::Exec(ExecTarget {
                command: "/usr/local/bin/ext".to_string(),
            }),
            ExtensionPlatform::Tcp(TcpTarget {
                address: "127.0.0.1:4000".to_string(),
            }),
            ExtensionPlatform::WebSocket(WebSocketTarget {
                url: "wss://ext.example.com".to_string(),
            }),
        ];
        for target in targets {
            let decoded: ExtensionPlatform = decode(&encode(&target).unwrap()).unwrap();
            assert_eq!(decoded, target);
        }
    }

    #[test]
    fn unknown_target_lists_tags() {
        let err = decode::<ExtensionPlatform>(br#"{"type":"grpc","address":"x"}"#).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownDiscriminant {
                valid_tags: &["docker", "exec", "tcp", "websocket"],
                ..
            }
        ));
    }

    #[test]
    fn remote_targets() {
        assert!(ExtensionPlatform::Tcp(TcpTarget {
            address: "h:1".to_string()
        })
        .is_remote());
        assert!(!ExtensionPlatform::Exec(ExecTarget {
            command: "x".to_string()
        })
        .is_remote());
    }

    #[test]
    fn manifest_decodes_nested_platform() {
        let manifest: ExtensionManifest = serde_json::from_str(
            r#"{
                "title": "Hover info",
                "activationEvents": ["*"],
                "args": {"verbose": true},
                "platform": {"type": "websocket", "url": "wss://hover.example.com"}
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.title, "Hover info");
        assert_eq!(
            manifest.platform,
            ExtensionPlatform::WebSocket(WebSocketTarget {
                url: "wss://hover.example.com".to_string()
            })
        );

        let again: ExtensionManifest =
            serde_json::from_value(serde_json::to_value(&manifest).unwrap()).unwrap();
        assert_eq!(again, manifest);
    }

    #[test]
    fn manifest_with_bad_platform_fails() {
        let err = serde_json::from_str::<ExtensionManifest>(
            r#"{"activationEvents": [], "platform": {"image": "x"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("docker"));
    }
}
