//! Discriminated-union codec.
//!
//! A tagged union travels as a flat JSON object whose discriminant property
//! (usually `"type"`) names the variant. The union contributes no wrapper of
//! its own: encoding writes the variant record and stamps the tag into it,
//! decoding probes the tag and then parses the whole object as that variant.

use std::fmt;

use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// A closed set of record types selected by a string discriminant.
///
/// Implementations are normally generated with [`tagged_union!`](crate::tagged_union).
pub trait TaggedUnion: Sized {
    /// Name of the discriminant property.
    const DISCRIMINANT: &'static str;

    /// Every registered tag, in declaration order.
    const TAGS: &'static [&'static str];

    fn tag(&self) -> &'static str;

    /// The active variant's record, without the discriminant.
    fn payload(&self) -> Result<Value, serde_json::Error>;

    /// Parses `deserializer` as the variant registered under `tag`.
    ///
    /// Returns `None` when no variant is registered for `tag`.
    fn decode_variant<'de, D>(tag: &str, deserializer: D) -> Option<Result<Self, D::Error>>
    where
        D: Deserializer<'de>;
}

pub fn encode<U: TaggedUnion>(union: &U) -> SchemaResult<Vec<u8>> {
    Ok(serde_json::to_vec(&encode_value(union)?)?)
}

pub fn encode_value<U: TaggedUnion>(union: &U) -> SchemaResult<Value> {
    match union.payload()? {
        Value::Object(mut fields) => {
            // The tag is written last so it always reflects the active variant.
            fields.insert(
                U::DISCRIMINANT.to_string(),
                Value::String(union.tag().to_string()),
            );
            Ok(Value::Object(fields))
        }
        _ => Err(SchemaError::NotAnObject { tag: union.tag() }),
    }
}

pub fn decode<U: TaggedUnion>(bytes: &[u8]) -> SchemaResult<U> {
    let found = probe_discriminant(bytes, U::DISCRIMINANT)?;
    let Some(Value::String(tag)) = &found else {
        return Err(unknown_discriminant::<U>(found.as_ref()));
    };

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let union = U::decode_variant(tag, &mut deserializer)
        .ok_or_else(|| unknown_discriminant::<U>(found.as_ref()))??;
    deserializer.end()?;
    Ok(union)
}

/// Decodes an already-parsed JSON value. Used when a union is nested inside
/// a larger document.
pub fn decode_value<U: TaggedUnion>(value: Value) -> SchemaResult<U> {
    let found = match &value {
        Value::Object(fields) => fields.get(U::DISCRIMINANT).cloned(),
        other => {
            return Err(SchemaError::Json(serde::de::Error::custom(format_args!(
                "expected a JSON object, found {}",
                json_kind(other)
            ))))
        }
    };
    let Some(Value::String(tag)) = &found else {
        return Err(unknown_discriminant::<U>(found.as_ref()));
    };

    Ok(U::decode_variant(tag, value).ok_or_else(|| unknown_discriminant::<U>(found.as_ref()))??)
}

fn unknown_discriminant<U: TaggedUnion>(found: Option<&Value>) -> SchemaError {
    SchemaError::UnknownDiscriminant {
        field: U::DISCRIMINANT,
        value: found.map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        valid_tags: U::TAGS,
    }
}

/// Article-prefixed name of a JSON value's type, for error messages.
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reads only the discriminant property, skipping every other value.
fn probe_discriminant(bytes: &[u8], field: &'static str) -> SchemaResult<Option<Value>> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let found = DiscriminantProbe { field }.deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(found)
}

#[derive(Clone, Copy)]
struct DiscriminantProbe {
    field: &'static str,
}

impl<'de> DeserializeSeed<'de> for DiscriminantProbe {
    type Value = Option<Value>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for DiscriminantProbe {
    type Value = Option<Value>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a JSON object with a {:?} property", self.field)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == self.field {
                found = Some(map.next_value::<Value>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

/// Declares an enum whose variants are selected by a string discriminant and
/// wires it into the [`TaggedUnion`] codec and serde.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Cat { pub lives: u8 }
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Dog { pub good: bool }
///
/// cascade_schema::tagged_union! {
///     pub enum Pet: "type" {
///         "cat" => Cat(Cat),
///         "dog" => Dog(Dog),
///     }
/// }
///
/// let pet: Pet = cascade_schema::decode(br#"{"type":"dog","good":true}"#).unwrap();
/// assert_eq!(pet, Pet::Dog(Dog { good: true }));
/// ```
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $field:literal {
            $( $(#[$vmeta:meta])* $tag:literal => $variant:ident($ty:ty) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant($ty), )+
        }

        impl $crate::TaggedUnion for $name {
            const DISCRIMINANT: &'static str = $field;
            const TAGS: &'static [&'static str] = &[$($tag),+];

            fn tag(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $tag, )+
                }
            }

            fn payload(&self) -> ::std::result::Result<::serde_json::Value, ::serde_json::Error> {
                match self {
                    $( Self::$variant(inner) => ::serde_json::to_value(inner), )+
                }
            }

            fn decode_variant<'de, D>(
                tag: &str,
                deserializer: D,
            ) -> ::std::option::Option<::std::result::Result<Self, D::Error>>
            where
                D: ::serde::Deserializer<'de>,
            {
                match tag {
                    $( $tag => ::std::option::Option::Some(
                        <$ty as ::serde::Deserialize>::deserialize(deserializer).map(Self::$variant),
                    ), )+
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                let value = $crate::encode_value(self)
                    .map_err(<S::Error as ::serde::ser::Error>::custom)?;
                ::serde::Serialize::serialize(&value, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let value = <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                $crate::decode_value(value).map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}
