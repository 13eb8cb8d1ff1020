//! Field values held by a message.

use crate::bitmap;
use crate::message::SubMessage;

/// A present field: either plain data or the embedded sub-message.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Logical value as ASCII bytes (before padding / after trimming).
    Data(Vec<u8>),
    SubMessage(Box<SubMessage>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Data(value.into().into_bytes())
    }

    /// A 64-bit quantity as 16 upper-case hex characters (Binary64 fields).
    pub fn binary64(word: u64) -> Self {
        Value::Data(bitmap::to_hex(word).into_bytes())
    }

    /// A Binary64 value given as hex text; case is normalised to upper.
    pub fn binary64_hex(hex: &str) -> Self {
        Value::Data(hex.to_ascii_uppercase().into_bytes())
    }

    /// Raw bytes as upper-case hex characters, two per byte (BN fields).
    pub fn binary_bytes(bytes: &[u8]) -> Self {
        let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        Value::Data(hex.into_bytes())
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Data(b) => Some(b),
            Value::SubMessage(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_sub_message(&self) -> Option<&SubMessage> {
        match self {
            Value::SubMessage(m) => Some(m.as_ref()),
            Value::Data(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Data(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Data(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Data(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Data(b.to_vec())
    }
}

impl From<SubMessage> for Value {
    fn from(m: SubMessage) -> Self {
        Value::SubMessage(Box::new(m))
    }
}
