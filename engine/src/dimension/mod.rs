//! Dimensions: named, constrained binding points for dataset columns.
//!
//! A [`Dimension`] is an immutable template built once with
//! [`DimensionBuilder`]. Each model instance gets its own
//! [`DimensionInstance`] per dimension, holding the mutable list of bound
//! columns.
//!
//! ```
//! use rawmap::dimension::{Accessor, Dimension};
//! use rawmap::models::ColumnType;
//!
//! let size = Dimension::builder()
//!     .title("Size")
//!     .types([ColumnType::Number])
//!     .accessor(Accessor::number())
//!     .build();
//!
//! let mut instance = size.instance("size");
//! assert!(instance.bound_keys().is_none());
//! instance.bind("Amount", Some(ColumnType::Number));
//! assert_eq!(instance.bound_keys(), Some(vec!["Amount"]));
//! ```

pub mod accessor;

use std::sync::Arc;

use serde::Serialize;

use crate::error::{AccessorResult, BindError, BindResult};
use crate::models::{ColumnType, Datum, Row};

pub use accessor::Accessor;

// =============================================================================
// Definition
// =============================================================================

/// Immutable dimension template.
#[derive(Debug, Clone)]
pub struct Dimension {
    title: String,
    description: Option<String>,
    required: usize,
    multiple: bool,
    types: Vec<ColumnType>,
    accessor: Accessor,
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            description: None,
            required: 0,
            multiple: false,
            types: ColumnType::all(),
            accessor: Accessor::text(),
        }
    }
}

impl Dimension {
    pub fn builder() -> DimensionBuilder {
        DimensionBuilder::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Minimum number of columns for the owning model to be valid.
    pub fn required(&self) -> usize {
        self.required
    }

    /// Whether more than one column may be bound.
    pub fn multiple(&self) -> bool {
        self.multiple
    }

    /// Accepted column types.
    pub fn types(&self) -> &[ColumnType] {
        &self.types
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// Whether a column of this sniffed type may be bound. Untyped
    /// (all-blank) columns are always accepted.
    pub fn accepts(&self, column_type: Option<ColumnType>) -> bool {
        column_type.map_or(true, |t| self.types.contains(&t))
    }

    /// Fresh, unbound instance of this definition.
    pub fn instance(self: &Arc<Self>, id: impl Into<String>) -> DimensionInstance {
        DimensionInstance::new(id, Arc::clone(self))
    }
}

/// Fluent builder for [`Dimension`].
#[derive(Debug, Clone, Default)]
pub struct DimensionBuilder {
    dimension: Dimension,
}

impl DimensionBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.dimension.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.dimension.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: usize) -> Self {
        self.dimension.required = required;
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.dimension.multiple = multiple;
        self
    }

    pub fn types(mut self, types: impl IntoIterator<Item = ColumnType>) -> Self {
        self.dimension.types = types.into_iter().collect();
        self
    }

    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.dimension.accessor = accessor;
        self
    }

    pub fn build(self) -> Arc<Dimension> {
        Arc::new(self.dimension)
    }
}

// =============================================================================
// Instance
// =============================================================================

/// A column bound to a dimension, with the type sniffed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub key: String,
    #[serde(rename = "type")]
    pub column_type: Option<ColumnType>,
}

/// Type of the bound column(s), shaped by the dimension's multiplicity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Single(ColumnType),
    Multiple(Vec<Option<ColumnType>>),
}

/// Accessor output, shaped by the dimension's multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    One(Datum),
    Many(Vec<Datum>),
}

/// A dimension definition plus its bound columns, owned by one model instance.
#[derive(Debug, Clone)]
pub struct DimensionInstance {
    id: String,
    definition: Arc<Dimension>,
    bindings: Vec<Binding>,
}

impl DimensionInstance {
    pub fn new(id: impl Into<String>, definition: Arc<Dimension>) -> Self {
        Self {
            id: id.into(),
            definition,
            bindings: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition(&self) -> &Dimension {
        &self.definition
    }

    pub fn title(&self) -> &str {
        self.definition.title()
    }

    pub fn required(&self) -> usize {
        self.definition.required()
    }

    pub fn multiple(&self) -> bool {
        self.definition.multiple()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn is_bound(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// How many more columns must be bound before `required` is met.
    pub fn missing(&self) -> usize {
        self.required().saturating_sub(self.bindings.len())
    }

    /// Bound column keys in binding order, `None` when nothing is bound.
    pub fn bound_keys(&self) -> Option<Vec<&str>> {
        if self.bindings.is_empty() {
            return None;
        }
        Some(self.bindings.iter().map(|b| b.key.as_str()).collect())
    }

    /// Append a binding without checks.
    ///
    /// A single-column dimension with several bindings only ever reads the first.
    pub fn bind(&mut self, key: impl Into<String>, column_type: Option<ColumnType>) {
        let key = key.into();
        log::debug!("Binding column '{}' to dimension '{}'", key, self.id);
        self.bindings.push(Binding { key, column_type });
    }

    /// Append a binding after checking accepted types and multiplicity.
    pub fn try_bind(
        &mut self,
        key: impl Into<String>,
        column_type: Option<ColumnType>,
    ) -> BindResult<()> {
        let key = key.into();
        if !self.definition.accepts(column_type) {
            return Err(BindError::TypeNotAccepted {
                dimension: self.id.clone(),
                column: key,
                // accepts() only refuses typed columns
                column_type: column_type.unwrap_or(ColumnType::String),
            });
        }
        if !self.multiple() {
            if let Some(bound) = self.bindings.first() {
                return Err(BindError::AlreadyBound {
                    dimension: self.id.clone(),
                    bound: bound.key.clone(),
                });
            }
        }
        self.bind(key, column_type);
        Ok(())
    }

    /// Remove every binding of `key`. Returns whether anything was removed.
    pub fn unbind(&mut self, key: &str) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.key != key);
        before != self.bindings.len()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Sniffed type of the first bound column.
    pub fn column_type(&self) -> Option<ColumnType> {
        self.bindings.first().and_then(|b| b.column_type)
    }

    /// Type of the first binding, or every binding's type for a multiple
    /// dimension. `None` when unbound or when the first binding is untyped.
    pub fn resolved_type(&self) -> Option<ResolvedType> {
        let first = self.column_type()?;
        if self.multiple() {
            Some(ResolvedType::Multiple(
                self.bindings.iter().map(|b| b.column_type).collect(),
            ))
        } else {
            Some(ResolvedType::Single(first))
        }
    }

    /// Accessor applied to the first bound column of `row`.
    pub fn value(&self, row: &Row) -> AccessorResult<Option<Datum>> {
        match self.bindings.first() {
            Some(binding) => self.convert(row, binding).map(Some),
            None => Ok(None),
        }
    }

    /// Accessor applied to every bound column of `row`, in binding order.
    pub fn values(&self, row: &Row) -> AccessorResult<Option<Vec<Datum>>> {
        if self.bindings.is_empty() {
            return Ok(None);
        }
        self.bindings
            .iter()
            .map(|binding| self.convert(row, binding))
            .collect::<AccessorResult<Vec<_>>>()
            .map(Some)
    }

    /// [`value`](Self::value) or [`values`](Self::values) depending on
    /// the dimension's multiplicity.
    pub fn value_for(&self, row: &Row) -> AccessorResult<Option<Extracted>> {
        if self.multiple() {
            Ok(self.values(row)?.map(Extracted::Many))
        } else {
            Ok(self.value(row)?.map(Extracted::One))
        }
    }

    fn convert(&self, row: &Row, binding: &Binding) -> AccessorResult<Datum> {
        let raw = row.get(&binding.key).unwrap_or("");
        self.definition
            .accessor()
            .apply(raw, binding.column_type)
            .map_err(|e| e.in_dimension(self.title()))
    }
}
