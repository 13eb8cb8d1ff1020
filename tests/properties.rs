//! Property tests over generated field sets of the built-in schema.

use iso8583::{Message, Value};
use proptest::prelude::*;
use proptest::string::{string_regex, RegexGeneratorStrategy};

/// Variable-length numeric fields with their maximum length.
const NUMERIC: &[(u8, usize)] = &[(2, 19), (32, 11), (33, 11), (58, 11), (93, 11), (94, 11), (100, 11)];
/// Variable-length printable fields with their maximum length.
const TEXT: &[(u8, usize)] = &[(43, 99), (101, 17), (102, 28), (103, 28)];

fn pattern(regex: &str) -> RegexGeneratorStrategy<String> {
    string_regex(regex).unwrap()
}

fn field_set() -> impl Strategy<Value = Vec<(u8, String)>> {
    let numeric: Vec<_> = NUMERIC
        .iter()
        .map(|&(index, max)| prop::option::of(pattern(&format!("[0-9]{{1,{}}}", max))).prop_map(move |v| v.map(|v| (index, v))))
        .collect();
    let text: Vec<_> = TEXT
        .iter()
        .map(|&(index, max)| prop::option::of(pattern(&format!("[ -~]{{0,{}}}", max))).prop_map(move |v| v.map(|v| (index, v))))
        .collect();
    (numeric, text).prop_map(|(n, t)| n.into_iter().chain(t).flatten().collect())
}

fn message(fields: &[(u8, String)]) -> Message {
    let mut m = Message::new("1200");
    for (index, value) in fields {
        m.set(*index, value.as_str()).unwrap();
    }
    m
}

proptest! {
    #[test]
    fn bitmap_marks_exactly_the_set_fields(fields in field_set()) {
        let mut m = message(&fields);
        m.encode().unwrap();
        let bitmaps = m.bitmaps();
        for index in 2..=128u8 {
            let expected = fields.iter().any(|(i, _)| *i == index);
            prop_assert_eq!(bitmaps.is_present(index), expected, "DE{}", index);
        }
        prop_assert_eq!(bitmaps.has_secondary(), fields.iter().any(|(i, _)| *i > 64));
    }

    #[test]
    fn encoding_ignores_insertion_order(fields in field_set()) {
        let forward = message(&fields).encode().unwrap();
        let reversed: Vec<_> = fields.iter().rev().cloned().collect();
        let backward = message(&reversed).encode().unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn decode_restores_variable_fields(fields in field_set()) {
        let mut m = message(&fields);
        let wire = m.encode().unwrap();
        let decoded = Message::decode(&wire).unwrap();
        prop_assert_eq!(decoded.fields().collect::<Vec<_>>(), m.fields().collect::<Vec<_>>());
        prop_assert_eq!(decoded.bitmaps(), m.bitmaps());
        for (index, value) in &fields {
            prop_assert_eq!(decoded.get(*index), Some(&Value::from(value.as_str())));
        }
    }

    #[test]
    fn fixed_numeric_pads_to_width(amount in 0u64..1_000_000_000_000) {
        let mut m = Message::new("1100");
        m.set(4, amount.to_string()).unwrap();
        let decoded = Message::decode(&m.encode().unwrap()).unwrap();
        let expected = format!("{:012}", amount);
        prop_assert_eq!(decoded.get_str(4), Some(expected.as_str()));
    }

    #[test]
    fn truncated_input_never_decodes(fields in field_set(), cut in 1usize..64) {
        let wire = message(&fields).encode().unwrap();
        let end = wire.len().saturating_sub(cut);
        prop_assert!(Message::decode(&wire[..end]).is_err());
    }
}
