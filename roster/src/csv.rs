//! Minimal CSV handling for spreadsheet exports.
//!
//! The export endpoint produces RFC-ish CSV: fields may be quoted, quoted
//! fields may contain commas and doubled quotes. Row 1 is always a header
//! and is skipped by [`parse_rows`].

use crate::error::RosterError;

/// Split one CSV line into trimmed, unquoted fields.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote inside a quoted field.
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(finish_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(finish_field(&current));
    fields
}

fn finish_field(raw: &str) -> String {
    raw.trim().trim_matches('"').to_string()
}

/// Parse a whole CSV document into data rows, skipping the header row.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    text.trim()
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .skip(1)
        .map(parse_line)
        .collect()
}

/// Map a spreadsheet column letter (A-Z, either case) to a zero-based index.
pub fn column_index(letter: &str) -> Result<usize, RosterError> {
    let trimmed = letter.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Ok(c.to_ascii_uppercase() as usize - 'A' as usize)
        }
        _ => Err(RosterError::InvalidColumn(letter.to_string())),
    }
}

/// Read a cell by index; out-of-range and blank cells read as `None`.
pub fn cell<'a>(row: &'a [String], index: usize) -> Option<&'a str> {
    row.get(index).map(String::as_str).filter(|s| !s.is_empty())
}
