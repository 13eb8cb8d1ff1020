//! Inspector session: decode lines, search the last message, report errors and continue.

use iso8583::inspect::{field_lines, format_fields, Inspector};
use iso8583::schema::iso8583_1993;
use iso8583::Message;
use std::fs::File;
use std::io::{BufReader, Write};

const NESTED_WIRE: &str = "1200F230040102A0000000000000040000081048468112122012340000100000001107221800000001161204171926FABCDE123ABD06414243000termid1210Community111123412342340454000000000000000Test Address                 ";

fn session(input: &str, safe: bool) -> String {
    let mut inspector = Inspector::new(iso8583_1993(), safe);
    let mut out = Vec::new();
    inspector.run(input.as_bytes(), &mut out, false).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn field_lines_include_nested_labels_and_names() {
    let m = Message::decode(NESTED_WIRE.as_bytes()).unwrap();
    let lines = field_lines(&m);
    assert_eq!(lines.first().unwrap().label, "DE2");
    assert_eq!(lines.first().unwrap().name, "Primary account number");
    let last = lines.last().unwrap();
    assert_eq!(last.label, "DE125.SE2");
    assert_eq!(last.name, "Cardholder address");
    assert_eq!(last.value, "Test Address");
}

#[test]
fn filter_matches_label_or_name_case_insensitively() {
    let m = Message::decode(NESTED_WIRE.as_bytes()).unwrap();
    let lines = field_lines(&m);
    assert_eq!(format_fields(&lines, Some("de41")), "DE41 -> termid12\n");
    let dates = format_fields(&lines, Some("DATE AND TIME"));
    assert_eq!(dates, "DE7 -> 1107221800\nDE12 -> 161204171926\n");
}

#[test]
fn decode_then_search_then_exit() {
    let out = session(&format!("{}\nsearch address\nexit\nsearch de2\n", NESTED_WIRE), false);
    assert!(out.starts_with("MTI -> 1200 (Financial request)\nDE2 -> 4846811212\n"));
    assert!(out.contains("DE125.SE2 -> Test Address\n"));
    assert!(out.ends_with("DE125.SE2 -> Test Address\nBye :)\n"));
}

#[test]
fn errors_are_reported_and_the_session_continues() {
    let out = session("1100ZZ00000000000000\n1100700000000000000003123000011000000000012\ne\n", false);
    let mut lines = out.lines();
    assert!(lines.next().unwrap().starts_with("error: Bitmap format"));
    assert_eq!(lines.next(), Some("MTI -> 1100 (Authorization request)"));
    assert_eq!(lines.next(), Some("DE2 -> 123"));
}

#[test]
fn search_before_any_message() {
    assert_eq!(session("search pan\n", false), "no message decoded yet\n");
}

#[test]
fn json_prints_the_last_message() {
    assert_eq!(session("json\n", false), "no message decoded yet\n");
    let out = session(&format!("{}\njson\n", NESTED_WIRE), true);
    let json = out.lines().last().unwrap();
    assert!(json.starts_with(r#"{"Mti":"1200","DE2":"xxxxxxxxxx","#));
    assert!(json.ends_with(r#""DE125":{"SE2":"Test Address"}}"#));
}

#[test]
fn safe_mode_masks_the_account_number() {
    let out = session(&format!("{}\n", NESTED_WIRE), true);
    assert!(out.contains("DE2 -> xxxxxxxxxx\n"));
    assert!(!out.contains("4846811212"));
}

#[test]
fn reads_messages_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "1100700000000000000003123000011000000000012").unwrap();
    writeln!(file, "{}", NESTED_WIRE).unwrap();
    file.flush().unwrap();

    let mut inspector = Inspector::new(iso8583_1993(), false);
    let mut out = Vec::new();
    let reader = BufReader::new(File::open(file.path()).unwrap());
    inspector.run(reader, &mut out, false).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("DE4 -> 000000000012\n"));
    assert!(text.contains("DE125.SE2 -> Test Address\n"));
    assert_eq!(inspector.last().unwrap().mti(), "1200");
}
