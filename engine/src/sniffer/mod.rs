//! Per-cell type classification and per-column type voting.
//!
//! Cells are classified in fixed precedence: Date, then Number, then
//! String. A column's type is the mode of its cell classifications, so a
//! mostly-numeric column with a stray label still sniffs as Number.

pub mod dates;

use crate::models::{ColumnMeta, ColumnType, Dataset};

pub use dates::{decode_date, is_date, to_epoch_millis};

/// Classify a single cell. Empty values do not vote and yield `None`.
pub fn type_of(value: &str) -> Option<ColumnType> {
    if value.is_empty() {
        return None;
    }
    if is_date(value) {
        Some(ColumnType::Date)
    } else if is_number(value) {
        Some(ColumnType::Number)
    } else {
        Some(ColumnType::String)
    }
}

pub fn is_number(value: &str) -> bool {
    parse_numeric(value).is_some()
}

/// Read a numeric literal the way a loosely typed data file means it.
///
/// Surrounding whitespace is ignored and a blank value reads as zero.
/// Accepts decimal and exponent notation, `0x`/`0o`/`0b` integers and
/// `Infinity`. Rejects everything else, including `NaN` and `inf`.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let t = value.trim();
    if t.is_empty() {
        return Some(0.0);
    }
    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = t.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }
    if !t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Most frequent item.
///
/// Among equally frequent items, the one whose first occurrence comes
/// earliest wins, not the one that reached the top count first:
/// `[b, a, a, b]` yields `b`.
pub fn mode<T: PartialEq + Clone>(items: &[T]) -> Option<T> {
    let mut counts: Vec<(&T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    let mut best: Option<(&T, usize)> = None;
    for (item, n) in counts {
        if best.map_or(true, |(_, max)| n > max) {
            best = Some((item, n));
        }
    }
    best.map(|(item, _)| item.clone())
}

/// Sniff every column of a dataset, in header order.
///
/// Duplicate header keys are reported once, at their first position.
pub fn sniff(dataset: &Dataset) -> Vec<ColumnMeta> {
    let mut metadata: Vec<ColumnMeta> = Vec::new();
    for key in dataset.header() {
        if metadata.iter().any(|m| &m.key == key) {
            continue;
        }
        let votes: Vec<ColumnType> = dataset
            .iter()
            .filter_map(|row| row.get(key).and_then(type_of))
            .collect();
        let column_type = mode(&votes);
        log::debug!("Column '{}' sniffed as {:?} from {} values", key, column_type, votes.len());
        metadata.push(ColumnMeta {
            key: key.clone(),
            column_type,
        });
    }
    metadata
}
