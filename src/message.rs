//! Top-level messages and the embedded sub-message.
//!
//! ```
//! use iso8583::Message;
//!
//! let mut m = Message::new("1100");
//! m.set(2, "123").unwrap();
//! m.set(3, "11").unwrap();
//! m.set(4, "12").unwrap();
//! assert_eq!(m.encode().unwrap(), b"1100700000000000000003123000011000000000012");
//! ```

use crate::assembler::{self, BitmapTree, Encoded, Fields};
use crate::bitmap::Bitmaps;
use crate::error::CodecError;
use crate::field::{Encoding, FieldKind};
use crate::inspect::{field_lines, format_fields, sub_message_lines};
use crate::mti;
use crate::schema::{self, Schema};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const MTI_LEN: usize = 4;

/// An ISO 8583 message: MTI, bitmaps and the present fields.
///
/// Bitmaps are derived state: recomputed by every [`encode`](Message::encode)
/// and overwritten by every decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    mti: String,
    encoding: Encoding,
    safe_log: bool,
    schema: Arc<Schema>,
    bitmaps: Bitmaps,
    fields: Fields,
}

impl Message {
    /// Empty message over the built-in ISO 8583:1993 schema.
    pub fn new(mti: impl Into<String>) -> Self {
        Self::with_schema(mti, schema::iso8583_1993())
    }

    pub fn with_schema(mti: impl Into<String>, schema: Arc<Schema>) -> Self {
        Message {
            mti: mti.into(),
            encoding: Encoding::default(),
            safe_log: false,
            schema,
            bitmaps: Bitmaps::default(),
            fields: Fields::new(),
        }
    }

    pub fn mti(&self) -> &str {
        &self.mti
    }

    pub fn set_mti(&mut self, mti: impl Into<String>) {
        self.mti = mti.into();
    }

    /// The registry entry for the MTI, if it is a known one.
    pub fn message_type(&self) -> Option<mti::MessageType> {
        mti::MessageType::from_code(&self.mti)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    pub fn safe_log(&self) -> bool {
        self.safe_log
    }

    /// Mask the primary account number in [`Display`](fmt::Display) output.
    pub fn set_safe_log(&mut self, safe_log: bool) {
        self.safe_log = safe_log;
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Set a plain field. Setting an empty value still marks the field present.
    pub fn set(&mut self, index: u8, value: impl Into<Value>) -> Result<(), CodecError> {
        insert(&self.schema, &mut self.fields, index, value.into())
    }

    /// Set the embedded sub-message field (DE125 in the built-in schema).
    pub fn set_sub_message(&mut self, sub: SubMessage) -> Result<(), CodecError> {
        let index = self
            .schema
            .sub_message_index()
            .ok_or(CodecError::KindMismatch(0))?;
        insert(&self.schema, &mut self.fields, index, Value::from(sub))
    }

    pub fn get(&self, index: u8) -> Option<&Value> {
        self.fields.get(&index)
    }

    /// A plain field's value as text.
    pub fn get_str(&self, index: u8) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn sub_message(&self) -> Option<&SubMessage> {
        let index = self.schema.sub_message_index()?;
        self.get(index).and_then(Value::as_sub_message)
    }

    pub fn sub_message_mut(&mut self) -> Option<&mut SubMessage> {
        let index = self.schema.sub_message_index()?;
        match self.fields.get_mut(&index) {
            Some(Value::SubMessage(sub)) => Some(sub.as_mut()),
            _ => None,
        }
    }

    pub fn remove(&mut self, index: u8) -> Option<Value> {
        self.fields.remove(&index)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.bitmaps = Bitmaps::default();
    }

    /// Present fields in ascending index order.
    pub fn fields(&self) -> impl Iterator<Item = (u8, &Value)> {
        self.fields.iter().map(|(&i, v)| (i, v))
    }

    pub fn bitmaps(&self) -> Bitmaps {
        self.bitmaps
    }

    pub fn primary_bitmap(&self) -> u64 {
        self.bitmaps.primary
    }

    /// The secondary word, present only when a field above 64 is.
    pub fn secondary_bitmap(&self) -> Option<u64> {
        self.bitmaps.secondary_word()
    }

    /// Serialize to `MTI | primary bitmap | [secondary bitmap] | fields`.
    pub fn encode(&mut self) -> Result<Vec<u8>, CodecError> {
        self.encoding.ensure_supported()?;
        let mti = mti::encode_mti(&self.mti)?;
        let encoded = assembler::encode_fields(&self.schema, &self.fields, self.encoding)?;
        let mut out = Vec::with_capacity(MTI_LEN + encoded.bytes.len());
        out.extend_from_slice(mti);
        out.extend_from_slice(&encoded.bytes);
        encoded.bitmaps.commit(&mut self.bitmaps, &mut self.fields);
        debug!(mti = %self.mti, fields = self.fields.len(), bytes = out.len(), "encoded message");
        Ok(out)
    }

    /// Decode a complete message with the built-in schema.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::decode_with_schema(schema::iso8583_1993(), bytes, Encoding::default())
    }

    /// Decode a complete message; every byte must belong to a field.
    ///
    /// The MTI must be 4 digits but need not be registered.
    pub fn decode_with_schema(schema: Arc<Schema>, bytes: &[u8], encoding: Encoding) -> Result<Self, CodecError> {
        encoding.ensure_supported()?;
        let mti = mti::decode_mti(bytes)?;
        let decoded = assembler::decode_fields(&schema, &bytes[MTI_LEN..], encoding)?;
        let end = MTI_LEN + decoded.consumed;
        if end < bytes.len() {
            return Err(CodecError::TrailingBytes(bytes.len() - end));
        }
        debug!(mti = %mti, fields = decoded.fields.len(), bytes = bytes.len(), "decoded message");
        Ok(Message {
            mti,
            encoding,
            safe_log: false,
            schema,
            bitmaps: decoded.bitmaps,
            fields: decoded.fields,
        })
    }

    /// Replace this message's state with the decoded `bytes`, keeping schema, encoding and safe-log.
    pub fn decode_into(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        let decoded = Self::decode_with_schema(Arc::clone(&self.schema), bytes, self.encoding)?;
        self.mti = decoded.mti;
        self.bitmaps = decoded.bitmaps;
        self.fields = decoded.fields;
        Ok(())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MTI -> {}", self.mti)?;
        f.write_str(&format_fields(&field_lines(self), None))
    }
}

/// The embedded message carried by the sub-message field: bitmaps and fields, no MTI.
#[derive(Debug, Clone, PartialEq)]
pub struct SubMessage {
    schema: Arc<Schema>,
    bitmaps: Bitmaps,
    fields: Fields,
}

impl Default for SubMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl SubMessage {
    /// Empty sub-message over the built-in private sub-element schema.
    pub fn new() -> Self {
        Self::with_schema(schema::private_sub_elements())
    }

    pub fn with_schema(schema: Arc<Schema>) -> Self {
        SubMessage {
            schema,
            bitmaps: Bitmaps::default(),
            fields: Fields::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn set(&mut self, index: u8, value: impl Into<Value>) -> Result<(), CodecError> {
        insert(&self.schema, &mut self.fields, index, value.into())
    }

    pub fn get(&self, index: u8) -> Option<&Value> {
        self.fields.get(&index)
    }

    pub fn get_str(&self, index: u8) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }

    pub fn remove(&mut self, index: u8) -> Option<Value> {
        self.fields.remove(&index)
    }

    pub fn fields(&self) -> impl Iterator<Item = (u8, &Value)> {
        self.fields.iter().map(|(&i, v)| (i, v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn bitmaps(&self) -> Bitmaps {
        self.bitmaps
    }

    pub fn primary_bitmap(&self) -> u64 {
        self.bitmaps.primary
    }

    pub fn secondary_bitmap(&self) -> Option<u64> {
        self.bitmaps.secondary_word()
    }

    /// Serialize to `primary bitmap | [secondary bitmap] | fields`.
    pub fn encode(&mut self) -> Result<Vec<u8>, CodecError> {
        let encoded = self.encode_level(Encoding::default())?;
        self.commit(encoded.bitmaps);
        Ok(encoded.bytes)
    }

    /// Encode without storing the recomputed bitmaps.
    pub(crate) fn encode_level(&self, encoding: Encoding) -> Result<Encoded, CodecError> {
        assembler::encode_fields(&self.schema, &self.fields, encoding)
    }

    pub(crate) fn commit(&mut self, tree: BitmapTree) {
        tree.commit(&mut self.bitmaps, &mut self.fields);
    }

    /// Decode a complete sub-message with the built-in sub-element schema.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Self::decode_with_schema(schema::private_sub_elements(), bytes, Encoding::default())
    }

    pub fn decode_with_schema(schema: Arc<Schema>, bytes: &[u8], encoding: Encoding) -> Result<Self, CodecError> {
        let decoded = assembler::decode_fields(&schema, bytes, encoding)?;
        if decoded.consumed < bytes.len() {
            return Err(CodecError::TrailingBytes(bytes.len() - decoded.consumed));
        }
        Ok(SubMessage {
            schema,
            bitmaps: decoded.bitmaps,
            fields: decoded.fields,
        })
    }
}

fn insert(schema: &Schema, fields: &mut Fields, index: u8, value: Value) -> Result<(), CodecError> {
    let label = schema.label(index);
    let spec = schema
        .spec(index)
        .ok_or_else(|| CodecError::UnknownField(index).in_field(label.as_str()))?;
    let nested = spec.kind == FieldKind::SubMessage;
    match &value {
        _ if spec.kind == FieldKind::Reserved => {
            return Err(CodecError::ReservedField(index).in_field(label));
        }
        Value::SubMessage(sub) if nested => {
            let Some(expected) = schema.sub_schema() else {
                return Err(CodecError::KindMismatch(index).in_field(label));
            };
            if !Arc::ptr_eq(expected, &sub.schema) && **expected != *sub.schema {
                return Err(CodecError::KindMismatch(index).in_field(label));
            }
        }
        Value::Data(_) if !nested => {}
        _ => return Err(CodecError::KindMismatch(index).in_field(label)),
    }
    fields.insert(index, value);
    Ok(())
}

/// The value with every character replaced by `x`.
pub fn mask(value: &str) -> String {
    "x".repeat(value.chars().count())
}

impl fmt::Display for SubMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fields(&sub_message_lines(self), None))
    }
}
