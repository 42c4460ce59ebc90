//! Domain models shared by the parser, the sniffer and the mappings.
//!
//! - [`Row`] / [`Dataset`] - header-keyed records in input order
//! - [`ColumnType`] / [`ColumnMeta`] - sniffed semantic type per column
//! - [`Datum`] - a cell after a dimension accessor converted it
//! - [`output`] - the shapes produced by the built-in mappings

pub mod output;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ParseError;

pub use output::{Graph, GraphLink, GraphNode, Output, Point, SeriesGroup, SeriesPoint, TreeNode};

// =============================================================================
// Column Type
// =============================================================================

/// Semantic type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Date,
    Number,
    String,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Number => "Number",
            Self::String => "String",
        }
    }

    /// Every type, in classification precedence order.
    pub fn all() -> Vec<ColumnType> {
        vec![Self::Date, Self::Number, Self::String]
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sniffed type of one column. `column_type` is `None` when every cell is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub key: String,
    #[serde(rename = "type")]
    pub column_type: Option<ColumnType>,
}

// =============================================================================
// Row
// =============================================================================

/// One data record keyed by the header.
///
/// Rows of a dataset share the header through an `Arc`; values are kept
/// in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    header: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    pub(crate) fn new(header: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self { header, values }
    }

    /// Value of a column. With duplicate header keys the rightmost column wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .rposition(|k| k == key)
            .map(|i| self.values[i].as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.header.iter().map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Skip keys that reappear later so the object matches `get`.
        let mut map = serializer.serialize_map(None)?;
        for (i, (key, value)) in self.iter().enumerate() {
            if self.header[i + 1..].iter().any(|k| k == key) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// Ordered rows produced by one parse. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    header: Arc<[String]>,
    rows: Vec<Row>,
}

impl Dataset {
    pub(crate) fn new(header: Vec<String>) -> Self {
        Self {
            header: header.into(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, values: Vec<String>) {
        self.rows.push(Row::new(Arc::clone(&self.header), values));
    }

    /// Build a dataset from a header and already-split records.
    ///
    /// Records are checked the same way the tokenizer checks them: a
    /// field-count mismatch fails with the 1-based record index.
    pub fn from_records<H, R, S>(header: H, records: R) -> Result<Self, ParseError>
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dataset = Self::new(header.into_iter().map(Into::into).collect());
        for (i, record) in records.into_iter().enumerate() {
            let values: Vec<String> = record.into_iter().map(Into::into).collect();
            if values.len() != dataset.header.len() {
                return Err(ParseError::new(i + 1));
            }
            dataset.push(values);
        }
        Ok(dataset)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.header.iter().any(|k| k == key)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

// =============================================================================
// Datum
// =============================================================================

/// A cell value after conversion by a dimension accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl Datum {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => f.write_str(&format_date(d)),
        }
    }
}

impl Serialize for Datum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serialize_number(n, serializer),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Date(d) => serializer.serialize_str(&format_date(d)),
        }
    }
}

// =============================================================================
// Number / Date rendering
// =============================================================================

/// Largest magnitude at which every integral f64 is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Serialize integral numbers as JSON integers and non-finite numbers as null.
pub fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !n.is_finite() {
        serializer.serialize_none()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*n as i64)
    } else {
        serializer.serialize_f64(*n)
    }
}

pub(crate) fn serialize_opt_number<S: Serializer>(
    n: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match n {
        Some(n) => serialize_number(n, serializer),
        None => serializer.serialize_none(),
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// ISO-8601 UTC rendering with millisecond precision.
pub fn format_date(d: &NaiveDateTime) -> String {
    d.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
