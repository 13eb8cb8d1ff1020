//! Schema DSL: syntax, name resolution and table checks, plus codec use of loaded schemas.

use iso8583::{load_schemas, parse_schemas, FieldKind, LengthFormat, Message, SchemaSet, SubMessage, Validator};

const NETWORK: &str = r#"
// Private sub-elements carried in field 125.
schema private {
    prefix SE;
    max 99;
    2: ans fixed 29 validate ANS "Cardholder address";
    5: reserved "Held for numbering";
    41: bn lllvar 100 validate BN;
}

/* Top-level table */
schema network {
    2: n llvar 19 validate N "Primary account number";
    3: n fixed 6 validate N "Processing code";
    4: n fixed 12 validate N;
    52: b64 fixed 64 validate B64;
    102: ans llvar 28 validate ANS;
    125: sub lllvar 999 validate ANS -> private;
}
"#;

#[test]
fn parses_schema_blocks() {
    let defs = parse_schemas(NETWORK).unwrap();
    assert_eq!(defs.len(), 2);
    let private = &defs[0];
    assert_eq!(private.name, "private");
    assert_eq!(private.prefix.as_deref(), Some("SE"));
    assert_eq!(private.max_index, Some(99));
    assert_eq!(private.fields.len(), 3);
    assert_eq!(private.fields[1].kind, FieldKind::Reserved);
    assert_eq!(private.fields[1].description.as_deref(), Some("Held for numbering"));
    assert_eq!(private.fields[2].validator, Some(Validator::BinaryHex));

    let network = &defs[1];
    let nested = network.fields.iter().find(|f| f.index == 125).unwrap();
    assert_eq!(nested.kind, FieldKind::SubMessage);
    assert_eq!(nested.format, LengthFormat::LLLVar);
    assert_eq!(nested.sub_schema.as_deref(), Some("private"));
}

#[test]
fn resolves_into_tables() {
    let set = load_schemas(NETWORK).unwrap();
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["private", "network"]);
    let network = set.get("network").unwrap();
    assert_eq!(network.prefix(), "DE", "prefix defaults to DE");
    assert_eq!(network.max_index(), 128, "max defaults to 128");
    assert_eq!(network.sub_message_index(), Some(125));
    assert_eq!(network.sub_schema().unwrap().name(), "private");
    assert_eq!(network.spec(2).unwrap().name, "Primary account number");
}

#[test]
fn loaded_schema_drives_the_codec() {
    let set = load_schemas(NETWORK).unwrap();
    let network = set.get("network").unwrap();
    let mut m = Message::with_schema("1100", network.clone());
    m.set(2, "123").unwrap();
    m.set(3, "11").unwrap();
    m.set(4, "12").unwrap();
    let mut sub = SubMessage::with_schema(set.get("private").unwrap());
    sub.set(2, "Test Address").unwrap();
    m.set_sub_message(sub).unwrap();

    let wire = m.encode().unwrap();
    let decoded = Message::decode_with_schema(network, &wire, Default::default()).unwrap();
    assert_eq!(decoded.get_str(4), Some("000000000012"));
    assert_eq!(decoded.sub_message().unwrap().get_str(2), Some("Test Address"));
}

#[test]
fn sub_message_with_foreign_schema_is_rejected() {
    let set = load_schemas(NETWORK).unwrap();
    let mut m = Message::with_schema("1100", set.get("network").unwrap());
    // The built-in sub-element table differs from `private`.
    assert!(m.set_sub_message(SubMessage::new()).is_err());
}

#[test]
fn syntax_errors() {
    for bad in [
        "schema { 2: n fixed 3; }",
        "schema s { 2: n fixed; }",
        "schema s { 2 n fixed 3; }",
        "schema s { 2: n fixed 3 }",
        "schema s { 2: q fixed 3; }",
        "schema s { 2: n sometimes 3; }",
        "schema s { 2: n fixed 3 validate NOPE; }",
        "schema s { prefix SE; prefix DE; }",
    ] {
        assert!(parse_schemas(bad).is_err(), "accepted: {}", bad);
    }
}

#[test]
fn comments_and_empty_input() {
    assert!(parse_schemas("").unwrap().is_empty());
    assert!(parse_schemas("// nothing\n/* here */").unwrap().is_empty());
}

#[test]
fn resolution_errors() {
    let cases = [
        ("schema a { 2: n fixed 3; } schema a { 3: n fixed 3; }", "Duplicate"),
        ("schema a { 125: sub lllvar 999 -> missing; }", "Unknown schema"),
        ("schema a { 125: sub lllvar 999 -> b; } schema b { 99: sub llvar 99 -> a; }", "Cyclic"),
        ("schema a { 125: sub lllvar 999 -> a; }", "Cyclic"),
        ("schema a { 2: n fixed 3 -> b; } schema b { 2: n fixed 3; }", "only sub fields"),
    ];
    for (source, needle) in cases {
        let err = SchemaSet::resolve(parse_schemas(source).unwrap()).unwrap_err();
        assert!(err.contains(needle), "{}: {}", source, err);
    }
}

#[test]
fn table_check_errors() {
    for bad in [
        "schema s { 35: z fixed 37 validate Z; }",
        "schema s { 41: bn fixed 10; }",
        "schema s { 52: b64 fixed 63; }",
        "schema s { 2: n fixed 0; }",
        "schema s { 2: ans llvar 100; }",
        "schema s { 1: n fixed 3; }",
        "schema s { max 99; 100: n fixed 3; }",
        "schema s { 2: n fixed 3; 2: n fixed 4; }",
        "schema s { 125: sub lllvar 999; }",
    ] {
        assert!(load_schemas(bad).is_err(), "accepted: {}", bad);
    }
}

#[test]
fn binary64_length_is_not_bounded_by_its_prefix() {
    let set = load_schemas("schema wide { 52: b64 llvar 128; }").unwrap();
    let schema = set.get("wide").unwrap();
    assert_eq!(schema.spec(52).unwrap().max_length, 128);

    let mut m = Message::with_schema("1100", schema);
    m.set(52, "0123456789ABCDEF0123456789ABCDEF").unwrap();
    let wire = m.encode().unwrap();
    assert_eq!(String::from_utf8(wire).unwrap(), "110000000000000010000123456789ABCDEF0123456789ABCDEF");
}
