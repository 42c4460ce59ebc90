//! Delimited text to [`Dataset`] with delimiter auto-detection.
//!
//! ```text
//! raw text ─▶ detect_delimiter ─▶ tokenize ─▶ header + records ─▶ Dataset
//! ```
//!
//! The first record is the header. Every later record must have as many
//! fields as the header; a lone blank record is skipped, anything else
//! aborts the parse with a [`ParseError`].

pub mod encoding;
pub mod tokenizer;

use crate::error::ParseError;
use crate::models::{ColumnMeta, Dataset};
use crate::sniffer;

pub use encoding::{decode_auto, decode_content, detect_encoding};
pub use tokenizer::tokenize;

/// Delimiters tried by [`detect_delimiter`], in tie-breaking order.
pub const CANDIDATE_DELIMITERS: [char; 5] = [',', ';', '\t', ':', '|'];

/// Pick the delimiter from the first line of `content`.
///
/// Counts unquoted occurrences of each candidate; a quote opens a quoted
/// span only at the start of a field and a doubled quote inside a span is
/// literal. The highest count wins, ties go to the earlier candidate.
/// Returns `None` when no candidate occurs (single-column data).
pub fn detect_delimiter(content: &str) -> Option<char> {
    let header = content.split('\n').next().unwrap_or("");

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut quoted = false;
    let mut field_start = true;
    let mut chars = header.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if quoted {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    quoted = false;
                }
            } else if field_start {
                quoted = true;
            }
        } else if !quoted {
            if let Some(i) = CANDIDATE_DELIMITERS.iter().position(|&d| d == c) {
                counts[i] += 1;
                field_start = true;
                continue;
            }
        }
        field_start = false;
    }

    let mut best: Option<(usize, usize)> = None;
    for (i, &count) in counts.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, max)| count > max) {
            best = Some((i, count));
        }
    }
    best.map(|(i, _)| CANDIDATE_DELIMITERS[i])
}

/// Parser configured with an explicit delimiter or auto-detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parser {
    delimiter: Option<char>,
}

impl Parser {
    /// A parser that detects the delimiter from each input's first line.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    pub fn delimiter(&self) -> Option<char> {
        self.delimiter
    }

    /// Delimiter that [`Parser::parse`] will use for `text`.
    pub fn resolve_delimiter(&self, text: &str) -> Option<char> {
        self.delimiter.or_else(|| detect_delimiter(text))
    }

    /// Parse `text` into header-keyed rows.
    ///
    /// Empty input yields an empty dataset.
    ///
    /// # Example
    /// ```
    /// use rawmap::parser::Parser;
    ///
    /// let rows = Parser::new().parse("name;age\nAlice;30\nBob;25").unwrap();
    ///
    /// assert_eq!(rows.len(), 2);
    /// assert_eq!(rows.rows()[0].get("name"), Some("Alice"));
    /// assert_eq!(rows.rows()[1].get("age"), Some("25"));
    /// ```
    pub fn parse(&self, text: &str) -> Result<Dataset, ParseError> {
        if text.is_empty() {
            return Ok(Dataset::new(Vec::new()));
        }

        let delimiter = self.resolve_delimiter(text);
        let mut records = tokenize(text, delimiter).into_iter();
        let header = records.next().unwrap_or_default();
        let width = header.len();
        let mut dataset = Dataset::new(header);

        for (i, record) in records.enumerate() {
            let index = i + 1;
            if record.len() == width {
                dataset.push(record);
            } else if record.len() == 1 && record[0].is_empty() {
                log::trace!("Skipping blank record {}", index);
            } else {
                log::debug!(
                    "Record {} has {} fields, header has {}",
                    index,
                    record.len(),
                    width
                );
                return Err(ParseError::new(index));
            }
        }

        log::debug!(
            "Parsed {} rows x {} columns (delimiter {:?})",
            dataset.len(),
            width,
            delimiter
        );
        Ok(dataset)
    }

    /// Parse `text` and sniff the type of every column.
    pub fn metadata(&self, text: &str) -> Result<Vec<ColumnMeta>, ParseError> {
        Ok(sniffer::sniff(&self.parse(text)?))
    }
}

/// Parse with an explicit delimiter, or detect it when `None`.
pub fn parse_str(text: &str, delimiter: Option<char>) -> Result<Dataset, ParseError> {
    match delimiter {
        Some(d) => Parser::with_delimiter(d).parse(text),
        None => Parser::new().parse(text),
    }
}

/// Display form of a delimiter for logs and CLI output.
pub fn format_delimiter(delimiter: Option<char>) -> String {
    match delimiter {
        Some('\t') => "TAB".to_string(),
        Some(c) => c.to_string(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    #[test]
    fn test_simple_csv() {
        let rows = parse_str("name;age\nAlice;30\nBob;25", Some(';')).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows()[0].get("name"), Some("Alice"));
        assert_eq!(rows.rows()[0].get("age"), Some("30"));
        assert_eq!(rows.rows()[1].get("name"), Some("Bob"));
        assert_eq!(rows.rows()[1].get("age"), Some("25"));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name;value\n\"Alice\";\"Hello; World\"";
        let rows = parse_str(csv, None).unwrap();

        assert_eq!(rows.rows()[0].get("name"), Some("Alice"));
        assert_eq!(rows.rows()[0].get("value"), Some("Hello; World"));
    }

    #[test]
    fn test_empty_input() {
        let rows = parse_str("", None).unwrap();
        assert!(rows.is_empty());
        assert!(rows.header().is_empty());
    }

    #[test]
    fn test_header_only() {
        let rows = parse_str("a,b,c\n", None).unwrap();
        assert!(rows.is_empty());
        assert_eq!(rows.header(), ["a", "b", "c"]);
    }

    #[test]
    fn test_trailing_blank_line_dropped() {
        let rows = parse_str("a,b\n1,2\n", None).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_field_count_mismatch_reports_row() {
        let err = parse_str("a,b\n1", None).unwrap_err();
        assert_eq!(err.row, 1);

        let err = parse_str("a,b\n1,2\n3,4\n5,6,7", None).unwrap_err();
        assert_eq!(err.row, 3);
    }

    #[test]
    fn test_missing_values_kept_empty() {
        let rows = parse_str("a;b;c\n1;;3", None).unwrap();
        assert_eq!(rows.rows()[0].get("b"), Some(""));
        assert_eq!(rows.rows()[0].get("c"), Some("3"));
    }

    #[test]
    fn test_single_column_keeps_blank_rows() {
        let rows = parse_str("name\nAlice\n\nBob", None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.rows()[1].get("name"), Some(""));
    }

    #[test]
    fn test_detect_delimiter_counts() {
        assert_eq!(detect_delimiter("a,b;c,d,e"), Some(','));
        assert_eq!(detect_delimiter("a;b;c\n1,2,3,4,5"), Some(';'));
        assert_eq!(detect_delimiter("a\tb\tc"), Some('\t'));
        assert_eq!(detect_delimiter("a:b:c"), Some(':'));
        assert_eq!(detect_delimiter("a|b|c"), Some('|'));
    }

    #[test]
    fn test_detect_delimiter_tie_prefers_precedence() {
        assert_eq!(detect_delimiter("a,b;c"), Some(','));
        assert_eq!(detect_delimiter("a|b;c"), Some(';'));
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_spans() {
        assert_eq!(detect_delimiter("\"a,b,c\";d"), Some(';'));
        assert_eq!(detect_delimiter("\"say \"\"x,y\"\"\";z"), Some(';'));
    }

    #[test]
    fn test_detect_delimiter_none() {
        assert_eq!(detect_delimiter("single"), None);
        assert_eq!(detect_delimiter(""), None);
    }

    #[test]
    fn test_metadata_mode_types() {
        let meta = Parser::new()
            .metadata("when,amount,label\n2020-01-01,1,a\n2020-02-01,2,b\n2020-03-01,x,c")
            .unwrap();
        assert_eq!(meta[0].column_type, Some(ColumnType::Date));
        assert_eq!(meta[1].column_type, Some(ColumnType::Number));
        assert_eq!(meta[2].column_type, Some(ColumnType::String));
    }

    #[test]
    fn test_round_trip_with_csv_writer() {
        let records = vec![
            vec!["id", "comment", "amount"],
            vec!["1", "plain", "10"],
            vec!["2", "with, comma", "20.5"],
            vec!["3", "with \"quotes\"", "-1"],
            vec!["4", "multi\nline", ""],
        ];
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        for record in &records {
            writer.write_record(record).unwrap();
        }
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let data = Parser::new().parse(&text).unwrap();
        assert_eq!(data.header(), records[0].as_slice());
        assert_eq!(data.len(), records.len() - 1);
        for (row, expected) in data.iter().zip(records.iter().skip(1)) {
            let values: Vec<&str> = row.values().iter().map(String::as_str).collect();
            assert_eq!(&values, expected);
        }
    }

    #[test]
    fn test_round_trip_semicolon_and_crlf() {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(["k", "v"]).unwrap();
        writer.write_record(["a;b", "1"]).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let data = Parser::with_delimiter(';').parse(&text).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.rows()[0].get("k"), Some("a;b"));
    }
}
