//! ASCII decimal length indicators (LLVAR .. LLLLLVAR).

use crate::error::CodecError;
use std::fmt;
use std::str::FromStr;

/// Length convention of a field: fixed width, or a variable payload preceded by a
/// zero-padded decimal prefix of 2..=5 digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthFormat {
    Fixed,
    LLVar,
    LLLVar,
    LLLLVar,
    LLLLLVar,
}

impl LengthFormat {
    /// Width of the length prefix; 0 for fixed fields.
    pub fn digits(self) -> usize {
        match self {
            LengthFormat::Fixed => 0,
            LengthFormat::LLVar => 2,
            LengthFormat::LLLVar => 3,
            LengthFormat::LLLLVar => 4,
            LengthFormat::LLLLLVar => 5,
        }
    }

    /// Largest length the prefix can express; `None` for fixed fields.
    pub fn max_representable(self) -> Option<usize> {
        match self {
            LengthFormat::Fixed => None,
            LengthFormat::LLVar => Some(99),
            LengthFormat::LLLVar => Some(999),
            LengthFormat::LLLLVar => Some(9_999),
            LengthFormat::LLLLLVar => Some(99_999),
        }
    }

    pub fn is_variable(self) -> bool {
        self != LengthFormat::Fixed
    }

    pub fn name(self) -> &'static str {
        match self {
            LengthFormat::Fixed => "fixed",
            LengthFormat::LLVar => "llvar",
            LengthFormat::LLLVar => "lllvar",
            LengthFormat::LLLLVar => "llllvar",
            LengthFormat::LLLLLVar => "lllllvar",
        }
    }
}

impl fmt::Display for LengthFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LengthFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(LengthFormat::Fixed),
            "llvar" => Ok(LengthFormat::LLVar),
            "lllvar" => Ok(LengthFormat::LLLVar),
            "llllvar" => Ok(LengthFormat::LLLLVar),
            "lllllvar" => Ok(LengthFormat::LLLLLVar),
            _ => Err(format!("unknown length format: {}", s)),
        }
    }
}

/// Encode `length` as a zero-padded decimal prefix of the format's width.
/// Fixed fields carry no prefix.
pub fn encode_length(length: usize, format: LengthFormat) -> Result<Vec<u8>, CodecError> {
    let Some(max) = format.max_representable() else {
        return Ok(Vec::new());
    };
    if length > max {
        return Err(CodecError::InvalidLength { length, max });
    }
    Ok(format!("{:0width$}", length, width = format.digits()).into_bytes())
}

/// Decode the length prefix at the head of `bytes`.
///
/// Returns `(payload_length, prefix_digits)`. The declared maximum is the field's
/// schema length, which may be stricter than the format's ceiling. A fixed field
/// has no prefix and a payload of exactly `declared_max` bytes.
pub fn decode_length(
    bytes: &[u8],
    format: LengthFormat,
    declared_max: usize,
) -> Result<(usize, usize), CodecError> {
    let digits = format.digits();
    if digits == 0 {
        return Ok((declared_max, 0));
    }
    let prefix = bytes.get(..digits).ok_or(CodecError::Truncated {
        needed: digits,
        available: bytes.len(),
    })?;
    if !prefix.iter().all(u8::is_ascii_digit) {
        return Err(CodecError::LengthParse(String::from_utf8_lossy(prefix).into_owned()));
    }
    let length = prefix
        .iter()
        .fold(0usize, |acc, &b| acc * 10 + usize::from(b - b'0'));
    if length > declared_max {
        return Err(CodecError::InvalidLength {
            length,
            max: declared_max,
        });
    }
    Ok((length, digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_digit_prefix_reads_all_four_digits() {
        assert_eq!(decode_length(b"0123rest", LengthFormat::LLLLVar, 9999).unwrap(), (123, 4));
    }

    #[test]
    fn prefix_boundaries() {
        assert_eq!(encode_length(99, LengthFormat::LLVar).unwrap(), b"99");
        assert_eq!(
            encode_length(100, LengthFormat::LLVar),
            Err(CodecError::InvalidLength { length: 100, max: 99 })
        );
        assert_eq!(encode_length(7, LengthFormat::LLLLLVar).unwrap(), b"00007");
    }

    #[test]
    fn non_numeric_prefix_is_a_parse_error() {
        assert!(matches!(
            decode_length(b"1A", LengthFormat::LLVar, 99),
            Err(CodecError::LengthParse(_))
        ));
    }
}
