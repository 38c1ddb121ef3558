//! CSV serialization of a view: one header row of display names, then one
//! row per record in view order. Every field is quoted with embedded quotes
//! doubled, so the output for a given view is byte-for-byte deterministic.

use std::io::{self, Write};
use std::mem::take;

use crate::domain::CanonicalRecord;
use crate::schema::Schema;

const SEP: char = ',';
const QUOTE: char = '"';

/* ---------------- Writing ---------------- */

fn quote(field: &str) -> String {
    let doubled = field.replace(QUOTE, "\"\"");
    format!("{QUOTE}{doubled}{QUOTE}")
}

/// Write a single row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let line: Vec<String> = row.iter().map(|cell| quote(cell)).collect();
    writeln!(w, "{}", line.join(&SEP.to_string()))
}

/// Display values for one record, in schema order.
pub fn record_row(schema: &Schema, record: &CanonicalRecord) -> Vec<String> {
    schema
        .ids()
        .map(|id| record.cell(id).render(&schema.field(id).kind))
        .collect()
}

/// Stream a header row plus the view to `w`.
pub fn write_csv<W: Write>(mut w: W, schema: &Schema, view: &[&CanonicalRecord]) -> io::Result<()> {
    write_row(&mut w, &schema.labels())?;
    for record in view {
        write_row(&mut w, &record_row(schema, record))?;
    }
    w.flush()
}

/// Render the view as a CSV string.
pub fn to_csv(schema: &Schema, view: &[&CanonicalRecord]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_csv(&mut buf, schema, view);

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

/* ---------------- Reading ---------------- */

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between separators, outside quotes.
    Bare,
    Quoted,
    /// Saw a quote inside a quoted field: either an escape or the close.
    QuoteInQuoted,
}

#[derive(Default)]
struct RowReader {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    field: String,
}

impl RowReader {
    fn end_field(&mut self) {
        self.row.push(take(&mut self.field));
    }

    /// Blank lines produce no row.
    fn end_row(&mut self) {
        self.end_field();
        let row = take(&mut self.row);
        if !(row.len() == 1 && row[0].is_empty()) {
            self.rows.push(row);
        }
    }
}

/// Read back what [`write_csv`] produces: quoted or bare fields, doubled
/// quotes, embedded newlines, LF or CRLF line ends.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut reader = RowReader::default();
    let mut state = State::Bare;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        state = match (state, ch) {
            (State::Quoted, QUOTE) => State::QuoteInQuoted,
            (State::Quoted, c) => {
                reader.field.push(c);
                State::Quoted
            }
            (State::QuoteInQuoted, QUOTE) => {
                reader.field.push(QUOTE);
                State::Quoted
            }
            (_, QUOTE) => State::Quoted,
            (_, SEP) => {
                reader.end_field();
                State::Bare
            }
            (_, '\r') if chars.peek() == Some(&'\n') => State::Bare,
            (_, '\n' | '\r') => {
                reader.end_row();
                State::Bare
            }
            (_, c) => {
                reader.field.push(c);
                State::Bare
            }
        };
    }

    if !reader.field.is_empty() || !reader.row.is_empty() || state != State::Bare {
        reader.end_row();
    }
    reader.rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
    use serde_json::json;

    #[test]
    fn test_quotes_are_doubled() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["say \"hi\"".to_string(), "a,b".to_string()]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "\"say \"\"hi\"\"\",\"a,b\"\n");
    }

    #[test]
    fn test_export_reads_back_identically() {
        let normalizer = DefaultNormalizer::new(Schema::episodes());
        let records = normalizer
            .normalize(&json!([
                {"rank": 1, "title": "The \"Unquiet\" Dead", "writer": "Mark Gatiss",
                 "doctor": {"actor": "Christopher Eccleston", "incarnation": "Ninth Doctor"}},
                {"rank": 2, "title": "Line\nbreak, and comma"},
                {}
            ]))
            .unwrap();
        let schema = normalizer.schema();
        let view: Vec<&CanonicalRecord> = records.iter().collect();

        let text = to_csv(schema, &view);
        let rows = parse_rows(&text);

        assert_eq!(rows.len(), view.len() + 1);
        assert_eq!(rows[0], schema.labels());
        for (row, record) in rows[1..].iter().zip(&view) {
            assert_eq!(row, &record_row(schema, record));
        }
        assert_eq!(rows[3][1], "Unknown");
    }

    #[test]
    fn test_reader_handles_bare_fields_crlf_and_blank_lines() {
        let rows = parse_rows("a,\"b,c\",d\r\n\r\n\"x\"\"y\",,z");
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b,c".to_string(), "d".to_string()],
                vec!["x\"y".to_string(), String::new(), "z".to_string()],
            ]
        );
    }

    #[test]
    fn test_empty_view_is_header_only() {
        let schema = Schema::books();
        let text = to_csv(&schema, &[]);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("\"Rank\",\"Title\",\"Author\""));
    }
}
