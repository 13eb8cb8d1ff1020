//! Line-oriented message inspector: decode raw message text and list its fields.

use crate::field::Encoding;
use crate::message::{mask, Message, SubMessage};
use crate::schema::Schema;
use crate::value::Value;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// One displayed field of a decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    /// Dotted label, e.g. `DE2` or `DE125.SE2`.
    pub label: String,
    /// Descriptive name from the schema; may be empty.
    pub name: String,
    pub value: String,
}

impl FieldLine {
    /// Case-insensitive substring match on label or name.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.label.to_lowercase().contains(&needle) || self.name.to_lowercase().contains(&needle)
    }
}

/// Present fields of `message` in wire order, nested sub-elements after their parent label.
///
/// With safe-log on, the top-level primary account number is masked.
pub fn field_lines(message: &Message) -> Vec<FieldLine> {
    let mut lines = Vec::new();
    push_lines(&mut lines, message.schema(), message.fields(), "", message.safe_log());
    lines
}

/// Present fields of a sub-message, labelled without a parent prefix.
pub fn sub_message_lines(sub: &SubMessage) -> Vec<FieldLine> {
    let mut lines = Vec::new();
    push_lines(&mut lines, sub.schema(), sub.fields(), "", false);
    lines
}

fn push_lines<'a>(
    lines: &mut Vec<FieldLine>,
    schema: &Schema,
    fields: impl Iterator<Item = (u8, &'a Value)>,
    parent: &str,
    mask_pan: bool,
) {
    for (index, value) in fields {
        let label = format!("{}{}", parent, schema.label(index));
        match value {
            Value::Data(raw) => {
                let mut text = String::from_utf8_lossy(raw).into_owned();
                if mask_pan && index == 2 {
                    text = mask(&text);
                }
                lines.push(FieldLine {
                    label,
                    name: field_name(schema, index),
                    value: text,
                });
            }
            Value::SubMessage(sub) => {
                push_lines(lines, sub.schema(), sub.fields(), &format!("{}.", label), false)
            }
        }
    }
}

fn field_name(schema: &Schema, index: u8) -> String {
    schema.spec(index).map(|s| s.name.clone()).unwrap_or_default()
}

/// Render lines as `LABEL -> value`, keeping only those matching `filter`.
pub fn format_fields(lines: &[FieldLine], filter: Option<&str>) -> String {
    let mut out = String::new();
    for line in lines.iter().filter(|l| filter.map_or(true, |f| l.matches(f))) {
        out.push_str(&line.label);
        out.push_str(" -> ");
        out.push_str(&line.value);
        out.push('\n');
    }
    out
}

/// One input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    /// Print the last message as JSON.
    Json,
    Search(String),
    Decode(String),
    Blank,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.trim() {
            "" => Command::Blank,
            "exit" | "e" => Command::Exit,
            "json" => Command::Json,
            trimmed => match trimmed.strip_prefix("search") {
                Some(rest) if rest.is_empty() || rest.starts_with(' ') => Command::Search(rest.trim().to_string()),
                _ => Command::Decode(line.trim_start().to_string()),
            },
        }
    }
}

/// Inspector state: the last successfully decoded message.
#[derive(Debug)]
pub struct Inspector {
    schema: Arc<Schema>,
    safe_log: bool,
    last: Option<Message>,
}

impl Inspector {
    pub fn new(schema: Arc<Schema>, safe_log: bool) -> Self {
        Inspector {
            schema,
            safe_log,
            last: None,
        }
    }

    pub fn last(&self) -> Option<&Message> {
        self.last.as_ref()
    }

    /// Handle one line. Returns `false` when the session should end.
    ///
    /// Decode errors are reported to `out` and leave the previous message in place.
    pub fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        match Command::parse(line) {
            Command::Exit => {
                writeln!(out, "Bye :)")?;
                return Ok(false);
            }
            Command::Blank => {}
            Command::Json => match &self.last {
                Some(message) => match message.to_json() {
                    Ok(json) => writeln!(out, "{}", json)?,
                    Err(e) => writeln!(out, "error: {}", e)?,
                },
                None => writeln!(out, "no message decoded yet")?,
            },
            Command::Search(needle) => match &self.last {
                Some(message) => {
                    let lines = field_lines(message);
                    let filter = (!needle.is_empty()).then_some(needle.as_str());
                    out.write_all(format_fields(&lines, filter).as_bytes())?;
                }
                None => writeln!(out, "no message decoded yet")?,
            },
            Command::Decode(text) => {
                match Message::decode_with_schema(Arc::clone(&self.schema), text.as_bytes(), Encoding::Ascii) {
                    Ok(mut message) => {
                        message.set_safe_log(self.safe_log);
                        debug!(mti = %message.mti(), "inspector decoded message");
                        if let Some(kind) = message.message_type() {
                            writeln!(out, "MTI -> {} ({})", message.mti(), kind.description())?;
                        } else {
                            writeln!(out, "MTI -> {}", message.mti())?;
                        }
                        out.write_all(format_fields(&field_lines(&message), None).as_bytes())?;
                        self.last = Some(message);
                    }
                    Err(e) => writeln!(out, "error: {}", e)?,
                }
            }
        }
        Ok(true)
    }

    /// Process lines until `exit` or end of input. `prompt` is written before each read.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W, prompt: bool) -> io::Result<()> {
        let mut line = String::new();
        loop {
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            if !self.handle(&line, &mut out)? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands() {
        assert_eq!(Command::parse("exit\n"), Command::Exit);
        assert_eq!(Command::parse("e"), Command::Exit);
        assert_eq!(Command::parse("json\r\n"), Command::Json);
        assert_eq!(Command::parse("search date\n"), Command::Search("date".into()));
        assert_eq!(Command::parse("search"), Command::Search(String::new()));
        assert_eq!(Command::parse("   \n"), Command::Blank);
    }

    #[test]
    fn decode_keeps_trailing_spaces() {
        assert_eq!(
            Command::parse("4000000000000000Test Address                 \r\n"),
            Command::Decode("4000000000000000Test Address                 ".into())
        );
    }
}
