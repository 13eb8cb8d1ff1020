//! Single-pass field assembly shared by [`Message`](crate::Message) and
//! [`SubMessage`](crate::SubMessage).
//!
//! Both directions walk field indices in strictly ascending order: fields are
//! self-delimiting only relative to the offset left by the previous one.

use crate::bitmap::Bitmaps;
use crate::error::CodecError;
use crate::field::{Encoding, FieldKind};
use crate::message::SubMessage;
use crate::schema::{FieldSpec, Schema};
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Present fields of one message level, keyed by index.
pub type Fields = BTreeMap<u8, Value>;

/// Recomputed bitmaps of one message level and of the sub-messages nested in it.
#[derive(Debug, Clone, Default)]
pub struct BitmapTree {
    pub bitmaps: Bitmaps,
    pub nested: Vec<(u8, BitmapTree)>,
}

impl BitmapTree {
    /// Store the bitmaps into `bitmaps` and into the nested sub-messages of `fields`.
    pub fn commit(self, bitmaps: &mut Bitmaps, fields: &mut Fields) {
        *bitmaps = self.bitmaps;
        for (index, tree) in self.nested {
            if let Some(Value::SubMessage(sub)) = fields.get_mut(&index) {
                sub.commit(tree);
            }
        }
    }
}

/// Encoded bitmaps and field data of one message level.
#[derive(Debug)]
pub struct Encoded {
    pub bitmaps: BitmapTree,
    /// Bitmap hex followed by field bytes.
    pub bytes: Vec<u8>,
}

/// Encode every present field of `fields` against `schema`.
///
/// Nothing is stored: the caller commits [`Encoded::bitmaps`] once the whole
/// message has encoded.
pub fn encode_fields(schema: &Schema, fields: &Fields, encoding: Encoding) -> Result<Encoded, CodecError> {
    encoding.ensure_supported()?;
    let mut tree = BitmapTree::default();
    let mut data = Vec::new();
    for (&index, value) in fields {
        let label = schema.label(index);
        let spec = schema
            .spec(index)
            .ok_or(CodecError::UnknownField(index))
            .map_err(|e| e.in_field(label.as_str()))?;
        let (bytes, nested) = encode_one(spec, value, encoding).map_err(|e| e.in_field(label.as_str()))?;
        trace!(field = %label, kind = %spec.kind, len = bytes.len(), "encoded field");
        tree.bitmaps.mark(index);
        if let Some(nested) = nested {
            tree.nested.push((index, nested));
        }
        data.extend_from_slice(&bytes);
    }

    let mut bytes = Vec::with_capacity(32 + data.len());
    tree.bitmaps.write_hex(&mut bytes);
    bytes.extend_from_slice(&data);
    Ok(Encoded { bitmaps: tree, bytes })
}

/// Decoded state of one message level.
#[derive(Debug)]
pub struct Decoded {
    pub bitmaps: Bitmaps,
    pub fields: Fields,
    /// Bytes read, bitmaps included.
    pub consumed: usize,
}

/// Decode bitmaps and the fields they mark from the head of `bytes`.
pub fn decode_fields(schema: &Schema, bytes: &[u8], encoding: Encoding) -> Result<Decoded, CodecError> {
    encoding.ensure_supported()?;
    let (bitmaps, mut offset) = Bitmaps::read_hex(bytes)?;
    let mut fields = Fields::new();
    for index in bitmaps.present_indices() {
        let label = schema.label(index);
        let spec = schema
            .spec(index)
            .ok_or(CodecError::UnknownField(index))
            .map_err(|e| e.in_field(label.as_str()))?;
        let (value, consumed) =
            decode_one(schema, spec, &bytes[offset..], encoding).map_err(|e| e.in_field(label.as_str()))?;
        trace!(field = %label, kind = %spec.kind, consumed, "decoded field");
        offset += consumed;
        fields.insert(index, value);
    }
    Ok(Decoded {
        bitmaps,
        fields,
        consumed: offset,
    })
}

fn encode_one(spec: &FieldSpec, value: &Value, encoding: Encoding) -> Result<(Vec<u8>, Option<BitmapTree>), CodecError> {
    match (spec.kind, value) {
        (FieldKind::SubMessage, Value::SubMessage(sub)) => {
            let inner = sub.encode_level(encoding)?;
            let bytes = spec.kind.encode(&inner.bytes, spec, encoding)?;
            Ok((bytes, Some(inner.bitmaps)))
        }
        (FieldKind::SubMessage, Value::Data(_)) | (_, Value::SubMessage(_)) => {
            Err(CodecError::KindMismatch(spec.index))
        }
        (kind, Value::Data(raw)) => Ok((kind.encode(raw, spec, encoding)?, None)),
    }
}

fn decode_one(
    schema: &Schema,
    spec: &FieldSpec,
    bytes: &[u8],
    encoding: Encoding,
) -> Result<(Value, usize), CodecError> {
    let (raw, consumed) = spec.kind.decode(bytes, spec, encoding)?;
    if spec.kind != FieldKind::SubMessage {
        return Ok((Value::Data(raw), consumed));
    }
    let nested: Arc<Schema> = schema
        .sub_schema()
        .cloned()
        .ok_or(CodecError::KindMismatch(spec.index))?;
    let sub = SubMessage::decode_with_schema(nested, &raw, encoding)?;
    Ok((Value::from(sub), consumed))
}
