//! # Presence bitmaps
//!
//! Field `i` (1..=64) is bit `64 - i` from the LSB; serialized as 16 upper-case hex
//! characters. Bit 1 of the primary word announces the secondary word, which carries
//! fields 65..=128 at local index `i - 64`.
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `set_bit_scenarios` | known bit sets serialize to the expected hex |
//! | `marking_high_field_forces_secondary` | index > 64 sets bit 1 and the local secondary bit |
//! | `read_hex_*` | 16 or 32 characters consumed depending on bit 1 |

use iso8583::bitmap::{is_set, set_bit, to_hex};
use iso8583::{Bitmaps, CodecError};

#[test]
fn set_bit_scenarios() {
    let scenarios: &[(&str, &[u8])] = &[
        ("42000104021C0078", &[2, 7, 24, 30, 39, 44, 45, 46, 58, 59, 60, 61]),
        ("4200010002140068", &[2, 7, 24, 39, 44, 46, 58, 59, 61]),
        ("0000010002140068", &[24, 39, 44, 46, 58, 59, 61]),
        ("A888010002143068", &[1, 3, 5, 9, 13, 24, 39, 44, 46, 51, 52, 58, 59, 61]),
    ];
    for (expected, bits) in scenarios {
        let word = bits.iter().fold(0u64, |w, &b| set_bit(w, b));
        assert_eq!(to_hex(word), *expected, "bits {:?}", bits);
        for &b in bits.iter() {
            assert!(is_set(word, b));
        }
    }
}

#[test]
fn marking_high_field_forces_secondary() {
    let mut maps = Bitmaps::default();
    maps.mark(2);
    assert!(!maps.has_secondary());
    assert_eq!(maps.secondary_word(), None);

    maps.mark(102);
    assert!(maps.has_secondary());
    assert_eq!(to_hex(maps.primary), "C000000000000000");
    assert_eq!(to_hex(maps.secondary), "0000000004000000");
    assert!(maps.is_present(102));
    assert!(!maps.is_present(1));
    assert_eq!(maps.present_indices().collect::<Vec<_>>(), vec![2, 102]);

    let mut out = Vec::new();
    maps.write_hex(&mut out);
    assert_eq!(out, b"C0000000000000000000000004000000");
}

#[test]
fn read_hex_primary_only() {
    let (maps, consumed) = Bitmaps::read_hex(b"7000000000000000rest").unwrap();
    assert_eq!(consumed, 16);
    assert_eq!(maps.present_indices().collect::<Vec<_>>(), vec![2, 3, 4]);
}

#[test]
fn read_hex_with_secondary() {
    let (maps, consumed) = Bitmaps::read_hex(b"F230040102A000000000000004000000").unwrap();
    assert_eq!(consumed, 32);
    assert_eq!(maps.secondary_word(), Some(0x0000_0000_0400_0000));
    assert!(maps.is_present(102));
}

#[test]
fn read_hex_truncated_secondary() {
    assert!(matches!(
        Bitmaps::read_hex(b"F230040102A00000000000"),
        Err(CodecError::Truncated { needed: 32, .. })
    ));
}
