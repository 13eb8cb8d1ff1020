//! JSON form of messages.
//!
//! A message level is an object keyed by field label (`DE2`, `SE85`, ...) holding
//! present fields in ascending index order; the embedded sub-message is a nested
//! object. The MTI, when set, comes first under `Mti`. Bitmaps are not written:
//! they are recomputed on encode, and a `DE1`/`SE1` key is ignored on input.
//!
//! ```
//! use iso8583::Message;
//!
//! let mut m = Message::new("1100");
//! m.set(2, "1234412").unwrap();
//! assert_eq!(m.to_json().unwrap(), r#"{"Mti":"1100","DE2":"1234412"}"#);
//! ```

use crate::error::CodecError;
use crate::field::FieldKind;
use crate::message::{mask, Message, SubMessage};
use crate::schema::{self, Schema};
use crate::value::Value;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

const MTI_KEY: &str = "Mti";

impl Message {
    /// Compact JSON. With safe-log on, the primary account number is masked.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the JSON form against the built-in schema.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Self::from_json_with_schema(schema::iso8583_1993(), text)
    }

    /// Parse the JSON form against `schema`. Values are checked against the schema
    /// on encode, not here.
    pub fn from_json_with_schema(schema: Arc<Schema>, text: &str) -> Result<Self, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(text);
        let message = MessageSeed(schema).deserialize(&mut de)?;
        de.end()?;
        Ok(message)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.mti().is_empty() {
            map.serialize_entry(MTI_KEY, self.mti())?;
        }
        write_entries(&mut map, self.schema(), self.fields(), self.safe_log())?;
        map.end()
    }
}

impl Serialize for SubMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        write_entries(&mut map, self.schema(), self.fields(), false)?;
        map.end()
    }
}

fn write_entries<'a, M: SerializeMap>(
    map: &mut M,
    schema: &Schema,
    fields: impl Iterator<Item = (u8, &'a Value)>,
    mask_pan: bool,
) -> Result<(), M::Error> {
    for (index, value) in fields {
        let label = schema.label(index);
        match value {
            Value::Data(raw) => {
                let text = String::from_utf8_lossy(raw);
                if mask_pan && index == 2 {
                    map.serialize_entry(&label, &mask(&text))?;
                } else {
                    map.serialize_entry(&label, &*text)?;
                }
            }
            Value::SubMessage(sub) => map.serialize_entry(&label, &**sub)?,
        }
    }
    Ok(())
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        MessageSeed(schema::iso8583_1993()).deserialize(deserializer)
    }
}

impl<'de> Deserialize<'de> for SubMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SubMessageSeed(schema::private_sub_elements()).deserialize(deserializer)
    }
}

/// Deserializes a top-level message against a schema.
pub struct MessageSeed(pub Arc<Schema>);

/// Deserializes a sub-message against its sub-element schema.
pub struct SubMessageSeed(pub Arc<Schema>);

impl<'de> DeserializeSeed<'de> for MessageSeed {
    type Value = Message;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Message, D::Error> {
        let level = deserializer.deserialize_map(LevelVisitor {
            schema: Arc::clone(&self.0),
            top: true,
        })?;
        let mut message = Message::with_schema(level.mti.unwrap_or_default(), self.0);
        for (index, value) in level.fields {
            message.set(index, value).map_err(<D::Error as de::Error>::custom)?;
        }
        Ok(message)
    }
}

impl<'de> DeserializeSeed<'de> for SubMessageSeed {
    type Value = SubMessage;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<SubMessage, D::Error> {
        let level = deserializer.deserialize_map(LevelVisitor {
            schema: Arc::clone(&self.0),
            top: false,
        })?;
        let mut sub = SubMessage::with_schema(self.0);
        for (index, value) in level.fields {
            sub.set(index, value).map_err(<D::Error as de::Error>::custom)?;
        }
        Ok(sub)
    }
}

struct Level {
    mti: Option<String>,
    fields: Vec<(u8, Value)>,
}

struct LevelVisitor {
    schema: Arc<Schema>,
    top: bool,
}

impl<'de> Visitor<'de> for LevelVisitor {
    type Value = Level;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an object of {} fields keyed by label", self.schema.name())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Level, A::Error> {
        let mut level = Level {
            mti: None,
            fields: Vec::new(),
        };
        while let Some(key) = map.next_key::<String>()? {
            if self.top && key == MTI_KEY {
                level.mti = Some(map.next_value()?);
                continue;
            }
            let index = key
                .strip_prefix(self.schema.prefix())
                .and_then(|n| n.parse::<u8>().ok())
                .ok_or_else(|| <A::Error as de::Error>::custom(format!("unknown field label {:?}", key)))?;
            if index == 1 {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            let kind = self
                .schema
                .spec(index)
                .map(|spec| spec.kind)
                .ok_or_else(|| <A::Error as de::Error>::custom(CodecError::UnknownField(index).in_field(key.as_str())))?;
            let value = if kind == FieldKind::SubMessage {
                let nested = self
                    .schema
                    .sub_schema()
                    .cloned()
                    .ok_or_else(|| <A::Error as de::Error>::custom(CodecError::KindMismatch(index).in_field(key.as_str())))?;
                Value::from(map.next_value_seed(SubMessageSeed(nested))?)
            } else {
                Value::from(map.next_value::<String>()?)
            };
            level.fields.push((index, value));
        }
        Ok(level)
    }
}
