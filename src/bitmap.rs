//! Presence bitmaps.
//!
//! A bitmap is a 64-bit word. Field `i` (1-based, 1..=64) lives at bit `64 - i`
//! counted from the least-significant bit, so field 1 is the most-significant bit
//! of the big-endian word. On the wire a bitmap is 16 upper-case hex characters.
//!
//! Bit 1 of the primary bitmap is not a field: it signals that a secondary bitmap
//! follows, which carries fields 65..=128 at local index `i - 64`.

use crate::error::CodecError;

/// Width of a serialized bitmap in ASCII characters.
pub const BITMAP_HEX_LEN: usize = 16;

/// Largest field index addressable with primary + secondary bitmaps.
pub const MAX_FIELD_INDEX: u8 = 128;

/// Return `word` with the bit for `index` set. `index` must be in 1..=64.
#[inline]
pub fn set_bit(word: u64, index: u8) -> u64 {
    debug_assert!((1..=64).contains(&index), "bitmap index {} out of range", index);
    word | 1u64 << (64 - u32::from(index))
}

/// Whether the bit for `index` (1..=64) is set.
#[inline]
pub fn is_set(word: u64, index: u8) -> bool {
    debug_assert!((1..=64).contains(&index), "bitmap index {} out of range", index);
    (word >> (64 - u32::from(index))) & 1 == 1
}

/// 16-character upper-case hex, zero-padded on the left.
pub fn to_hex(word: u64) -> String {
    format!("{:016X}", word)
}

/// Parse a hex bitmap. Lower-case digits are accepted; signs and other characters are not.
pub fn parse_hex(hex: &[u8]) -> Result<u64, CodecError> {
    let text = std::str::from_utf8(hex)
        .map_err(|_| CodecError::BitmapFormat(String::from_utf8_lossy(hex).into_owned()))?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::BitmapFormat(text.to_string()));
    }
    u64::from_str_radix(text, 16).map_err(|_| CodecError::BitmapFormat(text.to_string()))
}

/// Primary and secondary presence words of one message level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bitmaps {
    pub primary: u64,
    pub secondary: u64,
}

impl Bitmaps {
    /// Mark field `index` (2..=128) present. Indices above 64 force the secondary bitmap.
    pub fn mark(&mut self, index: u8) {
        if index <= 64 {
            self.primary = set_bit(self.primary, index);
        } else {
            self.primary = set_bit(self.primary, 1);
            self.secondary = set_bit(self.secondary, index - 64);
        }
    }

    pub fn has_secondary(&self) -> bool {
        is_set(self.primary, 1)
    }

    /// Whether field `index` (2..=128) is marked present.
    pub fn is_present(&self, index: u8) -> bool {
        match index {
            0 | 1 => false,
            2..=64 => is_set(self.primary, index),
            65..=MAX_FIELD_INDEX => self.has_secondary() && is_set(self.secondary, index - 64),
            _ => false,
        }
    }

    /// Present field indices in ascending order.
    pub fn present_indices(&self) -> impl Iterator<Item = u8> + '_ {
        (2..=MAX_FIELD_INDEX).filter(move |&i| self.is_present(i))
    }

    /// Secondary word, if bit 1 of the primary says one is carried.
    pub fn secondary_word(&self) -> Option<u64> {
        self.has_secondary().then_some(self.secondary)
    }

    /// Append the serialized bitmap(s): primary, then secondary when bit 1 is set.
    pub fn write_hex(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(to_hex(self.primary).as_bytes());
        if self.has_secondary() {
            out.extend_from_slice(to_hex(self.secondary).as_bytes());
        }
    }

    /// Parse primary (and secondary, when flagged) bitmaps from the head of `bytes`.
    /// Returns the bitmaps and the number of bytes consumed (16 or 32).
    pub fn read_hex(bytes: &[u8]) -> Result<(Bitmaps, usize), CodecError> {
        let primary = parse_hex(take(bytes, 0, BITMAP_HEX_LEN)?)?;
        let mut bitmaps = Bitmaps { primary, secondary: 0 };
        let mut consumed = BITMAP_HEX_LEN;
        if bitmaps.has_secondary() {
            bitmaps.secondary = parse_hex(take(bytes, consumed, BITMAP_HEX_LEN)?)?;
            consumed += BITMAP_HEX_LEN;
        }
        Ok((bitmaps, consumed))
    }
}

fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], CodecError> {
    bytes
        .get(offset..offset + len)
        .ok_or(CodecError::Truncated {
            needed: offset + len,
            available: bytes.len(),
        })
}
