// crates/chat-protocol/src/csv_codec.rs

//! CSV codec for the delivered-message history file.
//!
//! One record per delivered message, `\n` separated:
//!
//! `senderAddress,receiverAddress,date(YYYY-MM-DD),time(HH:MM:SS),content`
//!
//! e.g.
//!
//! ```text
//! 203.0.113.7,198.51.100.2,2024-05-01,21:14:03,hello
//! 203.0.113.7,198.51.100.2,2024-05-01,21:14:09,"well, hi ""there"""
//! ```
//!
//! Fields are quoted only when they must be: empty, containing a comma,
//! a double quote or a line break, or with leading/trailing whitespace.
//! Quotes inside a quoted field are doubled. A quoted content field may
//! therefore span several physical lines.

use chrono::{NaiveDate, NaiveTime};

use chat_core::DeliveredRecord;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

const FIELD_COUNT: usize = 5;

/// Format a record as a single CSV record (no trailing newline).
pub fn format_record(record: &DeliveredRecord) -> String {
    let date = record.date.format(DATE_FORMAT).to_string();
    let time = record.time.format(TIME_FORMAT).to_string();

    [
        record.sender_address.as_str(),
        record.receiver_address.as_str(),
        date.as_str(),
        time.as_str(),
        record.content.as_str(),
    ]
    .iter()
    .map(|field| escape_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Parse one record produced by [`format_record`].
///
/// Returns `None` for blank input, wrong field count, or unparseable
/// date/time.
pub fn parse_record_line(line: &str) -> Option<DeliveredRecord> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }

    let mut records = split_records(line);
    if records.len() != 1 {
        return None;
    }
    record_from_fields(records.pop()?)
}

/// Parse a whole history file. Malformed records are skipped.
pub fn parse_history(text: &str) -> Vec<DeliveredRecord> {
    split_records(text)
        .into_iter()
        .filter_map(record_from_fields)
        .collect()
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn needs_quotes(field: &str) -> bool {
    field.is_empty()
        || field.contains([',', '"', '\r', '\n'])
        || field.starts_with(char::is_whitespace)
        || field.ends_with(char::is_whitespace)
}

fn escape_field(field: &str) -> String {
    if needs_quotes(field) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn record_from_fields(fields: Vec<String>) -> Option<DeliveredRecord> {
    if fields.len() != FIELD_COUNT {
        return None;
    }

    let mut fields = fields.into_iter();
    let sender_address = fields.next()?;
    let receiver_address = fields.next()?;
    let date = NaiveDate::parse_from_str(&fields.next()?, DATE_FORMAT).ok()?;
    let time = NaiveTime::parse_from_str(&fields.next()?, TIME_FORMAT).ok()?;
    let content = fields.next()?;

    Some(DeliveredRecord {
        sender_address,
        receiver_address,
        date,
        time,
        content,
    })
}

/// Split CSV text into records of unescaped fields, honouring quotes.
/// Blank physical lines are skipped.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                if !fields.is_empty() || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut fields));
                }
            }
            _ => field.push(c),
        }
    }

    if !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        records.push(fields);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> DeliveredRecord {
        DeliveredRecord {
            sender_address: "203.0.113.7".into(),
            receiver_address: "198.51.100.2".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time: NaiveTime::from_hms_opt(21, 14, 3).unwrap(),
            content: content.into(),
        }
    }

    #[test]
    fn plain_content_is_unquoted() {
        assert_eq!(
            format_record(&record("hello")),
            "203.0.113.7,198.51.100.2,2024-05-01,21:14:03,hello"
        );
    }

    #[test]
    fn awkward_content_is_quoted() {
        assert_eq!(
            format_record(&record(r#"well, hi "there""#)),
            r#"203.0.113.7,198.51.100.2,2024-05-01,21:14:03,"well, hi ""there""""#
        );
        assert_eq!(
            format_record(&record("")),
            r#"203.0.113.7,198.51.100.2,2024-05-01,21:14:03,"""#
        );
        assert_eq!(
            format_record(&record(" padded")),
            r#"203.0.113.7,198.51.100.2,2024-05-01,21:14:03," padded""#
        );
    }

    #[test]
    fn history_with_multiline_content() {
        let text = format!(
            "{}\n{}\n\n{}\n",
            format_record(&record("one")),
            format_record(&record("two\nlines, really")),
            format_record(&record("")),
        );

        let parsed = parse_history(&text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].content, "two\nlines, really");
        assert_eq!(parsed[2].content, "");
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!(parse_record_line(""), None);
        assert_eq!(parse_record_line("a,b,c"), None);
        assert_eq!(parse_record_line("a,b,2024-13-01,21:14:03,x"), None);
        assert_eq!(parse_record_line("a,b,2024-05-01,25:00:00,x"), None);
        assert_eq!(
            parse_record_line("a,b,2024-05-01,21:14:03,x\n").map(|r| r.content),
            Some("x".to_string())
        );
    }
}
