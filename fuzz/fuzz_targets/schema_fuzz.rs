//! Fuzzes schema loading. Resolution has to turn reference cycles, unknown
//! sub-schema names, lengths above the prefix ceiling and fixed `z`/`bn` fields
//! into `Err(String)`. Every schema that does load then decodes the same input,
//! which must fail cleanly rather than overrun a table.
//!
//! Run: cargo fuzz run schema_fuzz

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(set) = iso8583::load_schemas(source) else {
        return;
    };
    for name in set.names() {
        if let Some(schema) = set.get(name) {
            let _ = iso8583::SubMessage::decode_with_schema(schema, data, iso8583::Encoding::Ascii);
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("schema_fuzz runs under cargo fuzz");
}
