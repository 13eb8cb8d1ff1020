//! Field codecs: the closed set of ISO 8583 field types.
//!
//! Each kind combines a padding/trim policy with the length indicator and the
//! field's validator. Validation runs on the logical value before encode and
//! after decode; a validation failure aborts the whole operation.
//!
//! | Kind | Fixed | Variable |
//! |------|-------|----------|
//! | N    | left-pad `'0'`, decoded verbatim | length prefix |
//! | AN / ANP / ANS | right-pad `' '`, trailing spaces trimmed on decode | length prefix, verbatim |
//! | Z    | unsupported | length prefix, verbatim |
//! | B64  | `maxLength / 4` hex characters, no prefix whatever the format | (same) |
//! | BN   | unsupported | length prefix, verbatim |
//! | Reserved | always fails | always fails |
//! | SubMessage | wraps a nested message as ANS | (same) |

use crate::error::CodecError;
use crate::length::{decode_length, encode_length, LengthFormat};
use crate::schema::FieldSpec;
use crate::validator;
use std::fmt;
use std::str::FromStr;

/// Character representation of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Printable ASCII, the only implemented representation.
    #[default]
    Ascii,
    /// Binary-coded decimal. Reserved; every encode/decode fails.
    Bcd,
}

impl Encoding {
    pub fn ensure_supported(self) -> Result<(), CodecError> {
        match self {
            Encoding::Ascii => Ok(()),
            Encoding::Bcd => Err(CodecError::UnsupportedEncoding(self)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// N: digits.
    Numeric,
    /// AN: letters and digits.
    AlphaNumeric,
    /// ANP: letters and digits, blank padded.
    AlphaNumericPadded,
    /// ANS: printable characters.
    AlphaNumericSpecial,
    /// Z: track 2 data.
    Track2,
    /// B64: a 64-bit quantity carried as hex characters; `max_length` is in bits.
    Binary64,
    /// BN: variable-length hex.
    BinaryVar,
    /// Placeholder slot that can never carry data.
    Reserved,
    /// Embedded sub-message carried as an ANS payload.
    SubMessage,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Numeric => "n",
            FieldKind::AlphaNumeric => "an",
            FieldKind::AlphaNumericPadded => "anp",
            FieldKind::AlphaNumericSpecial => "ans",
            FieldKind::Track2 => "z",
            FieldKind::Binary64 => "b64",
            FieldKind::BinaryVar => "bn",
            FieldKind::Reserved => "reserved",
            FieldKind::SubMessage => "sub",
        }
    }

    /// Whether the kind has a fixed-width form.
    pub fn supports(self, format: LengthFormat) -> bool {
        match self {
            FieldKind::Track2 | FieldKind::BinaryVar => format.is_variable(),
            _ => true,
        }
    }

    /// Encode the logical value `raw` for the field described by `spec`.
    pub fn encode(self, raw: &[u8], spec: &FieldSpec, encoding: Encoding) -> Result<Vec<u8>, CodecError> {
        encoding.ensure_supported()?;
        let format = spec.format;
        match self {
            FieldKind::Reserved => return Err(CodecError::ReservedField(spec.index)),
            FieldKind::Track2 | FieldKind::BinaryVar if !format.is_variable() => {
                return Err(CodecError::UnsupportedFormat { kind: self, format });
            }
            _ => {}
        }
        validator::validate(spec.validator, raw)?;

        if self == FieldKind::Binary64 {
            let width = spec.max_length / 4;
            if raw.len() != width {
                return Err(CodecError::InvalidLength {
                    length: raw.len(),
                    max: width,
                });
            }
            return Ok(raw.to_vec());
        }

        if raw.len() > spec.max_length {
            return Err(CodecError::InvalidLength {
                length: raw.len(),
                max: spec.max_length,
            });
        }
        if format.is_variable() {
            let mut out = encode_length(raw.len(), format)?;
            out.extend_from_slice(raw);
            return Ok(out);
        }

        let pad = spec.max_length - raw.len();
        let mut out = Vec::with_capacity(spec.max_length);
        if self == FieldKind::Numeric {
            out.resize(pad, b'0');
            out.extend_from_slice(raw);
        } else {
            out.extend_from_slice(raw);
            out.resize(spec.max_length, b' ');
        }
        Ok(out)
    }

    /// Decode one field from the head of `bytes`.
    ///
    /// Returns the logical value and the number of bytes consumed, prefix included.
    pub fn decode(self, bytes: &[u8], spec: &FieldSpec, encoding: Encoding) -> Result<(Vec<u8>, usize), CodecError> {
        encoding.ensure_supported()?;
        let format = spec.format;
        let (value, consumed) = match self {
            FieldKind::Reserved => return Err(CodecError::ReservedField(spec.index)),
            FieldKind::Track2 | FieldKind::BinaryVar if !format.is_variable() => {
                return Err(CodecError::UnsupportedFormat { kind: self, format });
            }
            FieldKind::Binary64 => {
                let width = spec.max_length / 4;
                (slice(bytes, 0, width)?.to_vec(), width)
            }
            _ => {
                let (length, digits) = decode_length(bytes, format, spec.max_length)?;
                let payload = slice(bytes, digits, length)?;
                let value = match self {
                    FieldKind::AlphaNumeric
                    | FieldKind::AlphaNumericPadded
                    | FieldKind::AlphaNumericSpecial
                    | FieldKind::SubMessage
                        if !format.is_variable() =>
                    {
                        trim_trailing_spaces(payload).to_vec()
                    }
                    _ => payload.to_vec(),
                };
                (value, digits + length)
            }
        };
        validator::validate(spec.validator, &value)?;
        Ok((value, consumed))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" => Ok(FieldKind::Numeric),
            "an" => Ok(FieldKind::AlphaNumeric),
            "anp" => Ok(FieldKind::AlphaNumericPadded),
            "ans" => Ok(FieldKind::AlphaNumericSpecial),
            "z" => Ok(FieldKind::Track2),
            "b64" => Ok(FieldKind::Binary64),
            "bn" => Ok(FieldKind::BinaryVar),
            "reserved" => Ok(FieldKind::Reserved),
            "sub" => Ok(FieldKind::SubMessage),
            _ => Err(format!("unknown field kind: {}", s)),
        }
    }
}

fn slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    bytes.get(offset..offset + len).ok_or(CodecError::Truncated {
        needed: offset + len,
        available: bytes.len(),
    })
}

fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    &bytes[..end]
}
