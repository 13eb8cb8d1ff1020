//! Fuzzes message decode against the built-in tables. A decoded message goes
//! back through encode, `Display` and JSON so that a bitmap naming a reserved
//! or undefined slot, or a length prefix past the input, surfaces as an error.
//!
//! Run: cargo fuzz run decode_fuzz

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let Ok(mut message) = iso8583::Message::decode(data) else {
        return;
    };
    let _ = message.to_string();
    if let Ok(json) = message.to_json() {
        let _ = iso8583::Message::from_json(&json);
    }
    let _ = message.encode();
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("decode_fuzz runs under cargo fuzz");
}
