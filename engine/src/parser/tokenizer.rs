//! Field/record tokenizer for delimited text.
//!
//! A field is either a double-quoted span, where `""` stands for a literal
//! quote and delimiters and line breaks are kept verbatim, or an unquoted
//! run up to the next delimiter or line break. Records end at `\n`,
//! `\r\n` or a lone `\r`.

use std::iter::Peekable;
use std::str::Chars;

/// Split `text` into records of fields.
///
/// With no delimiter every record has exactly one field. A trailing line
/// break yields a final record holding a single empty field; callers
/// decide what to do with it.
pub fn tokenize(text: &str, delimiter: Option<char>) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut at_field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if at_field_start && c == '"' {
            read_quoted(&mut chars, &mut field);
            at_field_start = false;
            continue;
        }
        at_field_start = false;

        match c {
            c if Some(c) == delimiter => {
                record.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                at_field_start = true;
            }
            c => field.push(c),
        }
    }

    record.push(field);
    records.push(record);
    records
}

/// Consume a quoted span after its opening quote. An unterminated span
/// runs to the end of input.
fn read_quoted(chars: &mut Peekable<Chars<'_>>, field: &mut String) {
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                field.push('"');
            } else {
                return;
            }
        } else {
            field.push(c);
        }
    }
}
