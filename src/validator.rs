//! Closed set of value format checks.
//!
//! Each validator is a hand-written matcher over the raw ASCII bytes of a field's
//! logical value (before padding on encode, after trimming on decode).

use crate::error::CodecError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Validator {
    /// Digits only, non-empty.
    Numeric,
    /// Upper-case hex digits, non-empty.
    BinaryHex,
    /// 64 binary digits, or 16 / 8 upper-case hex digits.
    Binary64,
    /// Letters and digits, non-empty.
    AlphaNumeric,
    /// Letters and digits followed by optional trailing spaces; all-blank is accepted.
    AlphaNumericPadded,
    /// Printable ASCII (space through tilde), possibly empty.
    AlphaNumericSpecial,
    /// Track 2 code set: digits, `=` and `D`.
    Track2,
    Yymmddhhmmss,
    Mmddhhmmss,
    Yymmdd,
    Yymm,
    Mmdd,
    Hhmmss,
}

impl Validator {
    pub const ALL: [Validator; 13] = [
        Validator::Numeric,
        Validator::BinaryHex,
        Validator::Binary64,
        Validator::AlphaNumeric,
        Validator::AlphaNumericPadded,
        Validator::AlphaNumericSpecial,
        Validator::Track2,
        Validator::Yymmddhhmmss,
        Validator::Mmddhhmmss,
        Validator::Yymmdd,
        Validator::Yymm,
        Validator::Mmdd,
        Validator::Hhmmss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Validator::Numeric => "N",
            Validator::BinaryHex => "BN",
            Validator::Binary64 => "B64",
            Validator::AlphaNumeric => "AN",
            Validator::AlphaNumericPadded => "ANP",
            Validator::AlphaNumericSpecial => "ANS",
            Validator::Track2 => "Z",
            Validator::Yymmddhhmmss => "YYMMDDHHMMSS",
            Validator::Mmddhhmmss => "MMDDHHMMSS",
            Validator::Yymmdd => "YYMMDD",
            Validator::Yymm => "YYMM",
            Validator::Mmdd => "MMDD",
            Validator::Hhmmss => "HHMMSS",
        }
    }

    pub fn matches(self, value: &[u8]) -> bool {
        match self {
            Validator::Numeric => !value.is_empty() && value.iter().all(u8::is_ascii_digit),
            Validator::BinaryHex => !value.is_empty() && value.iter().all(|&b| is_upper_hex(b)),
            Validator::Binary64 => match value.len() {
                64 => value.iter().all(|&b| b == b'0' || b == b'1'),
                16 | 8 => value.iter().all(|&b| is_upper_hex(b)),
                _ => false,
            },
            Validator::AlphaNumeric => {
                !value.is_empty() && value.iter().all(u8::is_ascii_alphanumeric)
            }
            Validator::AlphaNumericPadded => {
                let body = value.iter().take_while(|b| b.is_ascii_alphanumeric()).count();
                value[body..].iter().all(|&b| b == b' ')
            }
            Validator::AlphaNumericSpecial => value.iter().all(|&b| (b' '..=b'~').contains(&b)),
            Validator::Track2 => {
                !value.is_empty()
                    && value.iter().all(|&b| b.is_ascii_digit() || b == b'=' || b == b'D')
            }
            Validator::Yymmddhhmmss => date_time(value, &[Part::Year, Part::Month, Part::Day, Part::Hour, Part::Minute, Part::Second]),
            Validator::Mmddhhmmss => date_time(value, &[Part::Month, Part::Day, Part::Hour, Part::Minute, Part::Second]),
            Validator::Yymmdd => date_time(value, &[Part::Year, Part::Month, Part::Day]),
            Validator::Yymm => date_time(value, &[Part::Year, Part::Month]),
            Validator::Mmdd => date_time(value, &[Part::Month, Part::Day]),
            Validator::Hhmmss => date_time(value, &[Part::Hour, Part::Minute, Part::Second]),
        }
    }

    pub fn validate(self, value: &[u8]) -> Result<(), CodecError> {
        if self.matches(value) {
            Ok(())
        } else {
            Err(CodecError::Validation {
                validator: self,
                value: String::from_utf8_lossy(value).into_owned(),
            })
        }
    }
}

/// Run the optional validator of a field; no validator accepts anything.
pub fn validate(validator: Option<Validator>, value: &[u8]) -> Result<(), CodecError> {
    match validator {
        Some(v) => v.validate(value),
        None => Ok(()),
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Validator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "B" is the historical name of the variable-length hex check.
            "B" => Ok(Validator::BinaryHex),
            _ => Validator::ALL
                .into_iter()
                .find(|v| v.name() == s)
                .ok_or_else(|| format!("unknown validator: {}", s)),
        }
    }
}

fn is_upper_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'F').contains(&b)
}

#[derive(Clone, Copy)]
enum Part {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Part {
    fn range(self) -> (u8, u8) {
        match self {
            Part::Year => (0, 99),
            Part::Month => (1, 12),
            Part::Day => (1, 31),
            Part::Hour => (0, 23),
            Part::Minute | Part::Second => (0, 59),
        }
    }
}

fn date_time(value: &[u8], parts: &[Part]) -> bool {
    if value.len() != parts.len() * 2 || !value.iter().all(u8::is_ascii_digit) {
        return false;
    }
    value.chunks_exact(2).zip(parts).all(|(pair, part)| {
        let n = (pair[0] - b'0') * 10 + (pair[1] - b'0');
        let (lo, hi) = part.range();
        (lo..=hi).contains(&n)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for v in Validator::ALL {
            assert_eq!(v.name().parse::<Validator>().unwrap(), v);
        }
        assert_eq!("B".parse::<Validator>().unwrap(), Validator::BinaryHex);
        assert!("XYZ".parse::<Validator>().is_err());
    }

    #[test]
    fn date_parts_are_range_checked() {
        assert!(Validator::Mmdd.matches(b"1231"));
        assert!(!Validator::Mmdd.matches(b"1301"));
        assert!(!Validator::Mmdd.matches(b"0100"));
        assert!(Validator::Hhmmss.matches(b"235959"));
        assert!(!Validator::Hhmmss.matches(b"240000"));
        assert!(!Validator::Yymm.matches(b"99"));
    }

    #[test]
    fn anp_padding_is_spaces_only() {
        assert!(Validator::AlphaNumericPadded.matches(b"AB12  "));
        assert!(Validator::AlphaNumericPadded.matches(b"      "));
        assert!(!Validator::AlphaNumericPadded.matches(b"AB12\t "));
        assert!(!Validator::AlphaNumericPadded.matches(b"AB 12"));
    }
}
