//! Error types for the rawmap ingestion and mapping engine.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`ParseError`] - record field-count mismatch while tokenizing
//! - [`EncodingError`] - byte input that could not be decoded
//! - [`AccessorError`] - a dimension's conversion function rejected a cell
//! - [`BindError`] - a checked column binding was refused
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across layer boundaries.

use thiserror::Error;

use crate::models::ColumnType;

/// Message carried by every [`ParseError`] unless the caller supplies one.
pub const DEFAULT_PARSE_MESSAGE: &str = "Sorry something went wrong while parsing your data.";

// =============================================================================
// Parsing Errors
// =============================================================================

/// A data record whose field count differs from the header's.
///
/// `row` is the 1-based record index: the header is record 0, the first
/// data record is 1. Parsing aborts on the first mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Row {row}: {message}")]
pub struct ParseError {
    pub row: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            message: DEFAULT_PARSE_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors while turning raw bytes into text.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The requested encoding label is not one we can decode.
    #[error("Unsupported encoding: {0}")]
    Unsupported(String),

    /// The bytes are not valid for the requested encoding.
    #[error("Invalid {encoding} content: {message}")]
    Invalid { encoding: String, message: String },
}

// =============================================================================
// Accessor Errors
// =============================================================================

/// A dimension accessor refused a cell value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot convert '{value}' for dimension '{dimension}': {message}")]
pub struct AccessorError {
    pub dimension: String,
    pub value: String,
    pub message: String,
}

impl AccessorError {
    pub fn new(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            dimension: String::new(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Attach the title of the dimension whose accessor failed.
    pub fn in_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = dimension.into();
        self
    }
}

// =============================================================================
// Binding Errors
// =============================================================================

/// Errors from checked column binding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// The model has no dimension with this id.
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    /// The dataset has no column with this key.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The column's sniffed type is outside the dimension's accepted types.
    #[error("Dimension '{dimension}' does not accept {column_type} column '{column}'")]
    TypeNotAccepted {
        dimension: String,
        column: String,
        column_type: ColumnType,
    },

    /// A second column was bound to a single-column dimension.
    #[error("Dimension '{dimension}' takes a single column and is already bound to '{bound}'")]
    AlreadyBound { dimension: String, bound: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by the ingestion and mapping pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Tokenizing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Decoding failed.
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// A binding was refused.
    #[error("Binding error: {0}")]
    Bind(#[from] BindError),

    /// A mapping aborted on a cell conversion.
    #[error("Accessor error: {0}")]
    Accessor(#[from] AccessorError),

    /// No model registered under this name.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Failed to read input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for accessor and mapping calls.
pub type AccessorResult<T> = Result<T, AccessorError>;

/// Result type for checked binding.
pub type BindResult<T> = Result<T, BindError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
