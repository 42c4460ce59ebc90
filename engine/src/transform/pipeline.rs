//! High-level pipeline: raw input to mapped output.
//!
//! This module combines every step: decoding, delimiter detection,
//! parsing, type sniffing, binding and mapping.
//!
//! # Example
//!
//! ```
//! use rawmap::registry::ModelRegistry;
//! use rawmap::transform::{ingest_str, map_dataset, IngestOptions, MappingRequest};
//!
//! let ingested = ingest_str("From,To\nA,B\nA,B", &IngestOptions::default()).unwrap();
//! let request = MappingRequest::new("graph").bind("steps", ["From", "To"]);
//!
//! let outcome = map_dataset(&ModelRegistry::with_builtins(), &ingested, &request).unwrap();
//! assert!(outcome.valid);
//! assert_eq!(outcome.output.as_graph().unwrap().links[0].value, 2.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BindError, PipelineError, PipelineResult};
use crate::models::{ColumnMeta, ColumnType, Dataset, Output};
use crate::parser::{decode_auto, decode_content, format_delimiter, Parser};
use crate::registry::ModelRegistry;
use crate::sniffer;

// =============================================================================
// Ingestion
// =============================================================================

/// Options for reading input. `None` fields are detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Field delimiter.
    pub delimiter: Option<char>,

    /// Encoding label for byte input, e.g. `"utf-8"` or `"iso-8859-1"`.
    pub encoding: Option<String>,
}

/// A parsed dataset with what was detected while reading it.
#[derive(Debug, Clone, Serialize)]
pub struct Ingested {
    pub dataset: Dataset,

    /// Delimiter used, `None` for single-column input.
    pub delimiter: Option<char>,

    pub encoding: String,

    /// Sniffed type of every column, in header order.
    pub metadata: Vec<ColumnMeta>,
}

impl Ingested {
    /// Sniffed type of `key`; `None` for unknown or all-blank columns.
    pub fn column_type(&self, key: &str) -> Option<ColumnType> {
        self.metadata
            .iter()
            .find(|m| m.key == key)
            .and_then(|m| m.column_type)
    }
}

/// Parse already-decoded text.
pub fn ingest_str(text: &str, options: &IngestOptions) -> PipelineResult<Ingested> {
    ingest_text(text, "utf-8".to_string(), options)
}

/// Decode then parse raw bytes.
pub fn ingest_bytes(bytes: &[u8], options: &IngestOptions) -> PipelineResult<Ingested> {
    let (text, encoding) = match &options.encoding {
        Some(label) => (decode_content(bytes, label)?, label.to_lowercase()),
        None => decode_auto(bytes),
    };
    log::info!("Detected encoding: {}", encoding);
    ingest_text(&text, encoding, options)
}

/// Read, decode and parse a file.
pub fn ingest_file(path: &Path, options: &IngestOptions) -> PipelineResult<Ingested> {
    log::info!("Reading {}", path.display());
    let bytes = std::fs::read(path)?;
    ingest_bytes(&bytes, options)
}

fn ingest_text(text: &str, encoding: String, options: &IngestOptions) -> PipelineResult<Ingested> {
    let parser = match options.delimiter {
        Some(d) => Parser::with_delimiter(d),
        None => Parser::new(),
    };
    let delimiter = parser.resolve_delimiter(text);
    log::info!("Detected delimiter: '{}'", format_delimiter(delimiter));

    let dataset = parser.parse(text)?;
    log::info!(
        "Read {} rows, {} columns",
        dataset.len(),
        dataset.header().len()
    );

    let metadata = sniffer::sniff(&dataset);
    for meta in &metadata {
        log::debug!(
            "Column '{}': {}",
            meta.key,
            meta.column_type.map_or("empty", |t| t.as_str())
        );
    }

    Ok(Ingested {
        dataset,
        delimiter,
        encoding,
        metadata,
    })
}

// =============================================================================
// Mapping
// =============================================================================

/// Columns to bind to one dimension, in binding order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRequest {
    pub dimension: String,
    pub columns: Vec<String>,
}

/// Which model to apply and how to bind it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRequest {
    pub model: String,

    #[serde(default)]
    pub bindings: Vec<BindingRequest>,
}

impl MappingRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            bindings: Vec::new(),
        }
    }

    pub fn bind<I, S>(mut self, dimension: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bindings.push(BindingRequest {
            dimension: dimension.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// Mapped output plus the validation state of the model instance.
#[derive(Debug, Clone, Serialize)]
pub struct MapOutcome {
    pub output: Output,
    pub valid: bool,

    /// Empty when `valid`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instruction: String,
}

/// Instantiate `request.model`, bind the requested columns with their
/// sniffed types and apply the mapping.
///
/// Bindings are checked against each dimension's accepted types. An
/// instance that is still under-bound is mapped anyway; the outcome
/// carries `valid == false` and the instruction text.
pub fn map_dataset(
    registry: &ModelRegistry,
    ingested: &Ingested,
    request: &MappingRequest,
) -> PipelineResult<MapOutcome> {
    let mut instance = registry
        .instantiate(&request.model)
        .ok_or_else(|| PipelineError::UnknownModel(request.model.clone()))?;

    for binding in &request.bindings {
        for column in &binding.columns {
            if !ingested.dataset.has_column(column) {
                return Err(BindError::UnknownColumn(column.clone()).into());
            }
            instance.try_bind(&binding.dimension, column, ingested.column_type(column))?;
        }
    }

    let valid = instance.is_valid();
    let instruction = instance.instruction();

    log::info!("Applying model '{}'", request.model);
    let output = instance.apply(&ingested.dataset)?;
    log::info!("Produced {} items", output.len());

    Ok(MapOutcome {
        output,
        valid,
        instruction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const FRUIT: &str = "Category;Amount;When\nFruit;3;2020-01-01\nFruit;2;2020-01-02\nVeg;1;2020-01-01\n";

    #[test]
    fn test_ingest_str_detects_and_sniffs() {
        let ingested = ingest_str(FRUIT, &IngestOptions::default()).unwrap();
        assert_eq!(ingested.delimiter, Some(';'));
        assert_eq!(ingested.dataset.len(), 3);
        assert_eq!(ingested.column_type("Category"), Some(ColumnType::String));
        assert_eq!(ingested.column_type("Amount"), Some(ColumnType::Number));
        assert_eq!(ingested.column_type("When"), Some(ColumnType::Date));
        assert_eq!(ingested.column_type("Missing"), None);
    }

    #[test]
    fn test_ingest_bytes_latin1() {
        let mut bytes = b"name,city\nRen\xe9,Orl\xe9ans\n".to_vec();
        bytes.extend_from_slice(b"Zo\xe9,N\xeemes\n");
        let options = IngestOptions {
            encoding: Some("ISO-8859-1".to_string()),
            ..IngestOptions::default()
        };
        let ingested = ingest_bytes(&bytes, &options).unwrap();
        assert_eq!(ingested.encoding, "iso-8859-1");
        assert_eq!(ingested.dataset.rows()[0].get("name"), Some("René"));
        assert_eq!(ingested.dataset.rows()[1].get("city"), Some("Nîmes"));
    }

    #[test]
    fn test_ingest_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FRUIT.as_bytes()).unwrap();

        let ingested = ingest_file(file.path(), &IngestOptions::default()).unwrap();
        assert_eq!(ingested.encoding, "utf-8");
        assert_eq!(ingested.dataset.header(), ["Category", "Amount", "When"]);
    }

    #[test]
    fn test_ingest_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingest_file(&dir.path().join("absent.csv"), &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_ingest_reports_parse_error() {
        let err = ingest_str("a,b\n1", &IngestOptions::default()).unwrap_err();
        match err {
            PipelineError::Parse(e) => assert_eq!(e.row, 1),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_map_tree() {
        let ingested = ingest_str(FRUIT, &IngestOptions::default()).unwrap();
        let request = MappingRequest::new("tree")
            .bind("hierarchy", ["Category"])
            .bind("size", ["Amount"]);
        let outcome = map_dataset(&ModelRegistry::with_builtins(), &ingested, &request).unwrap();

        assert!(outcome.valid);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "output": { "children": [
                    { "name": "Fruit", "class": "String", "size": 5 },
                    { "name": "Veg", "class": "String", "size": 1 }
                ]},
                "valid": true
            })
        );
    }

    #[test]
    fn test_map_mostly_numeric_size_column() {
        let ingested = ingest_str("Cat,Qty\nA,1\nA,2\nB,n/a", &IngestOptions::default()).unwrap();
        assert_eq!(ingested.column_type("Qty"), Some(ColumnType::Number));
        let registry = ModelRegistry::with_builtins();

        let request = MappingRequest::new("graph")
            .bind("steps", ["Cat", "Cat"])
            .bind("size", ["Qty"]);
        let outcome = map_dataset(&registry, &ingested, &request).unwrap();
        let values: Vec<f64> = outcome.output.as_graph().unwrap().links.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![3.0, 0.0]);

        let request = MappingRequest::new("tree")
            .bind("hierarchy", ["Cat"])
            .bind("size", ["Qty"]);
        let outcome = map_dataset(&registry, &ingested, &request).unwrap();
        assert_eq!(
            serde_json::to_value(&outcome.output).unwrap(),
            json!({ "children": [
                { "name": "A", "class": "String", "size": 3 },
                { "name": "B", "class": "String", "size": null }
            ]})
        );
    }

    #[test]
    fn test_map_invalid_instance_still_maps() {
        let ingested = ingest_str(FRUIT, &IngestOptions::default()).unwrap();
        let request = MappingRequest::new("timeSeries").bind("group", ["Category"]);
        let outcome = map_dataset(&ModelRegistry::with_builtins(), &ingested, &request).unwrap();

        assert!(!outcome.valid);
        assert_eq!(outcome.instruction, "Date requires at least 1 more dimension");
        assert_eq!(outcome.output.as_series().unwrap().len(), 2);
    }

    #[test]
    fn test_map_rejects_unknown_model_and_column() {
        let ingested = ingest_str(FRUIT, &IngestOptions::default()).unwrap();
        let registry = ModelRegistry::with_builtins();

        let err = map_dataset(&registry, &ingested, &MappingRequest::new("pie")).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownModel(_)));

        let request = MappingRequest::new("tree").bind("hierarchy", ["Nope"]);
        let err = map_dataset(&registry, &ingested, &request).unwrap_err();
        assert!(matches!(err, PipelineError::Bind(BindError::UnknownColumn(_))));
    }

    #[test]
    fn test_map_rejects_type_mismatch() {
        let ingested = ingest_str(FRUIT, &IngestOptions::default()).unwrap();
        let request = MappingRequest::new("points").bind("x", ["Category"]);
        let err = map_dataset(&ModelRegistry::with_builtins(), &ingested, &request).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Bind(BindError::TypeNotAccepted { .. })
        ));
    }

    #[test]
    fn test_mapping_request_from_json() {
        let request: MappingRequest = serde_json::from_value(json!({
            "model": "graph",
            "bindings": [{ "dimension": "steps", "columns": ["From", "To"] }]
        }))
        .unwrap();
        assert_eq!(request, MappingRequest::new("graph").bind("steps", ["From", "To"]));
    }
}
