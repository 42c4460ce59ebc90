//! # Rawmap - tabular ingestion and dimensional mapping
//!
//! Rawmap reads delimited text (CSV, TSV, semicolon or pipe separated),
//! infers a semantic type for every column, and maps the rows onto a
//! structural shape (tree, time series, points, graph) by binding columns
//! to the dimensions of a model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Raw Text   │────▶│   Parser    │────▶│   Sniffer   │────▶│   Dataset   │
//! │ (any enc.)  │     │ (auto-delim)│     │ (col types) │     │  + metadata │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │   Output    │◀────│ Model inst. │◀───────────┘
//!                     │   (JSON)    │     │ (bindings)  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use rawmap::{ingest_str, map_dataset, IngestOptions, MappingRequest, ModelRegistry};
//!
//! let csv = "Category,Amount\nFruit,3\nFruit,2\nVeg,1";
//! let ingested = ingest_str(csv, &IngestOptions::default()).unwrap();
//!
//! let request = MappingRequest::new("tree")
//!     .bind("hierarchy", ["Category"])
//!     .bind("size", ["Amount"]);
//! let outcome = map_dataset(&ModelRegistry::with_builtins(), &ingested, &request).unwrap();
//!
//! let root = outcome.output.as_tree().unwrap();
//! assert_eq!(root.child("Fruit").unwrap().size, Some(5.0));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Rows, datasets, column types and output shapes
//! - [`parser`] - Delimiter detection, tokenizing, encoding
//! - [`sniffer`] - Cell and column type inference
//! - [`dimension`] - Dimension definitions, instances and accessors
//! - [`transform`] - Models, built-in mappings and the pipeline
//! - [`registry`] - Named model lookup

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;
pub mod sniffer;

// Mapping
pub mod dimension;
pub mod transform;

// Registry
pub mod registry;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AccessorError, AccessorResult, BindError, BindResult, EncodingError, ParseError, ParseResult,
    PipelineError, PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ColumnMeta, ColumnType, Dataset, Datum, Graph, GraphLink, GraphNode, Output, Point,
    Row, SeriesGroup, SeriesPoint, TreeNode,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_auto, decode_content, detect_delimiter, detect_encoding, format_delimiter, parse_str,
    tokenize, Parser,
};
pub use sniffer::{is_date, is_number, mode, sniff, type_of};

// =============================================================================
// Re-exports - Dimensions & Models
// =============================================================================

pub use dimension::{Accessor, Binding, Dimension, DimensionBuilder, DimensionInstance, Extracted, ResolvedType};
pub use transform::{DimensionSet, Model, ModelBuilder, ModelInstance};

// =============================================================================
// Re-exports - Registry
// =============================================================================

pub use registry::ModelRegistry;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    ingest_bytes, ingest_file, ingest_str, map_dataset, BindingRequest, IngestOptions, Ingested,
    MapOutcome, MappingRequest,
};
