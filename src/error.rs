//! Error taxonomy shared by every encode/decode path.
//!
//! All errors are terminal for the current call: the first one aborts the whole
//! encode or decode and nothing partially built is returned.

use crate::field::{Encoding, FieldKind};
use crate::length::LengthFormat;
use crate::validator::Validator;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Unknown MTI: {0:?} is not a registered message type")]
    UnknownMti(String),
    #[error("Invalid MTI: {0:?} is not 4 ASCII digits")]
    InvalidMti(String),
    #[error("Bitmap format: {0:?} is not a hexadecimal 64-bit word")]
    BitmapFormat(String),
    #[error("Length parse: {0:?} is not a decimal length indicator")]
    LengthParse(String),
    #[error("Invalid length: {length} exceeds maximum {max}")]
    InvalidLength { length: usize, max: usize },
    #[error("Validation: {validator} rejects {value:?}")]
    Validation { validator: Validator, value: String },
    #[error("Reserved field: index {0} is reserved and cannot carry a value")]
    ReservedField(u8),
    #[error("Unsupported format: {kind} does not support {format}")]
    UnsupportedFormat { kind: FieldKind, format: LengthFormat },
    #[error("Unsupported encoding: {0:?} is not implemented")]
    UnsupportedEncoding(Encoding),
    #[error("Truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("Trailing bytes: {0} bytes left after the last field")]
    TrailingBytes(usize),
    #[error("Unknown field: index {0} is not defined by the schema")]
    UnknownField(u8),
    #[error("Kind mismatch: value at index {0} does not match the schema kind")]
    KindMismatch(u8),
    #[error("{field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Attach the label of the field being processed (e.g. `DE35`).
    pub fn in_field(self, field: impl Into<String>) -> Self {
        CodecError::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with all field attribution stripped.
    pub fn innermost(&self) -> &CodecError {
        match self {
            CodecError::Field { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Dotted path of the failing element, e.g. `DE125.SE41`.
    pub fn field_path(&self) -> Option<String> {
        match self {
            CodecError::Field { field, source } => match source.field_path() {
                Some(inner) => Some(format!("{}.{}", field, inner)),
                None => Some(field.clone()),
            },
            _ => None,
        }
    }
}
