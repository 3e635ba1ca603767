//! Records that keep unrecognized keys.
//!
//! Decoding pulls the known fields out of the object and keeps whatever is
//! left in an `additional` bag; encoding starts from a copy of that bag and
//! writes the known fields over it, so known fields always win.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Removes `key` from `fields` and decodes it, treating absent or `null` as the default.
fn take_known<T>(fields: &mut Map<String, Value>, key: &str) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value),
    }
}

fn overlay<I>(additional: &Map<String, Value>, known: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    let mut fields = additional.clone();
    for (key, value) in known {
        fields.insert(key.to_string(), value);
    }
    fields
}

/// Settings for a single extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionSettings {
    pub disabled: bool,
    pub additional: Map<String, Value>,
}

impl ExtensionSettings {
    const DISABLED: &'static str = "disabled";
}

impl Serialize for ExtensionSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        overlay(
            &self.additional,
            [(Self::DISABLED, Value::Bool(self.disabled))],
        )
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExtensionSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let disabled = take_known(&mut fields, Self::DISABLED).map_err(de::Error::custom)?;
        Ok(Self {
            disabled,
            additional: fields,
        })
    }
}

/// The `settings` block handed to an extension at initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitializationSettings {
    /// The subject's merged settings, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<Value>,
}

/// Initialization options for an extension: the known `settings` block plus
/// any other top-level options the client sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitializationOptions {
    pub settings: InitializationSettings,
    pub other: Map<String, Value>,
}

impl InitializationOptions {
    const SETTINGS: &'static str = "settings";
}

impl Serialize for InitializationOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let settings = serde_json::to_value(&self.settings).map_err(ser::Error::custom)?;
        overlay(&self.other, [(Self::SETTINGS, settings)]).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InitializationOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let settings = take_known(&mut fields, Self::SETTINGS).map_err(de::Error::custom)?;
        Ok(Self {
            settings,
            other: fields,
        })
    }
}
