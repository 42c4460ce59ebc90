//! Model framework: a set of dimensions plus a mapping function.
//!
//! ```text
//! ModelBuilder ─▶ Arc<Model> ──instance()──▶ ModelInstance
//!                                              ├─ DimensionSet (bindings)
//!                                              └─ apply(&Dataset) ─▶ Output
//! ```
//!
//! A [`Model`] is immutable and shared; every [`ModelInstance`] owns its
//! own dimension instances, so binding columns on one instance never
//! affects another.

use std::fmt;
use std::sync::Arc;

use crate::dimension::{Dimension, DimensionInstance};
use crate::error::{AccessorResult, BindError, BindResult};
use crate::models::{ColumnType, Dataset, Output};

/// Mapping function of a model.
pub type MapFn = dyn Fn(&Dataset, &DimensionSet) -> AccessorResult<Output> + Send + Sync;

// =============================================================================
// Dimension Set
// =============================================================================

/// Ordered dimension instances of one model instance, addressed by id.
#[derive(Debug, Clone, Default)]
pub struct DimensionSet {
    dimensions: Vec<DimensionInstance>,
}

impl DimensionSet {
    pub fn get(&self, id: &str) -> Option<&DimensionInstance> {
        self.dimensions.iter().find(|d| d.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut DimensionInstance> {
        self.dimensions.iter_mut().find(|d| d.id() == id)
    }

    /// Instance for `id` when it exists and has at least one binding.
    pub fn bound(&self, id: &str) -> Option<&DimensionInstance> {
        self.get(id).filter(|d| d.is_bound())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DimensionInstance> {
        self.dimensions.iter()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

impl<'a> IntoIterator for &'a DimensionSet {
    type Item = &'a DimensionInstance;
    type IntoIter = std::slice::Iter<'a, DimensionInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.dimensions.iter()
    }
}

// =============================================================================
// Model
// =============================================================================

/// Immutable model definition.
pub struct Model {
    title: String,
    description: Option<String>,
    dimensions: Vec<(String, Arc<Dimension>)>,
    map: Arc<MapFn>,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Dimension definitions in declaration order.
    pub fn dimensions(&self) -> impl Iterator<Item = (&str, &Dimension)> {
        self.dimensions.iter().map(|(id, d)| (id.as_str(), d.as_ref()))
    }

    /// Fresh instance with every dimension unbound.
    pub fn instance(self: &Arc<Self>) -> ModelInstance {
        let dimensions = self
            .dimensions
            .iter()
            .map(|(id, definition)| definition.instance(id.clone()))
            .collect();
        ModelInstance {
            model: Arc::clone(self),
            dimensions: DimensionSet { dimensions },
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`Model`]. Without [`map`](Self::map) the model
/// returns the dataset unchanged.
pub struct ModelBuilder {
    title: String,
    description: Option<String>,
    dimensions: Vec<(String, Arc<Dimension>)>,
    map: Arc<MapFn>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            description: None,
            dimensions: Vec::new(),
            map: Arc::new(|data: &Dataset, _: &DimensionSet| Ok(Output::Rows(data.clone()))),
        }
    }
}

impl ModelBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a dimension. Redeclaring an id replaces the earlier
    /// definition in place.
    pub fn dimension(mut self, id: impl Into<String>, dimension: Arc<Dimension>) -> Self {
        let id = id.into();
        match self.dimensions.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = dimension,
            None => self.dimensions.push((id, dimension)),
        }
        self
    }

    pub fn map<F>(mut self, map: F) -> Self
    where
        F: Fn(&Dataset, &DimensionSet) -> AccessorResult<Output> + Send + Sync + 'static,
    {
        self.map = Arc::new(map);
        self
    }

    pub fn build(self) -> Arc<Model> {
        Arc::new(Model {
            title: self.title,
            description: self.description,
            dimensions: self.dimensions,
            map: self.map,
        })
    }
}

// =============================================================================
// Model Instance
// =============================================================================

/// A model with its own binding state.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    model: Arc<Model>,
    dimensions: DimensionSet,
}

impl ModelInstance {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn title(&self) -> &str {
        self.model.title()
    }

    pub fn description(&self) -> Option<&str> {
        self.model.description()
    }

    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }

    pub fn dimension(&self, id: &str) -> Option<&DimensionInstance> {
        self.dimensions.get(id)
    }

    pub fn dimension_mut(&mut self, id: &str) -> Option<&mut DimensionInstance> {
        self.dimensions.get_mut(id)
    }

    /// Bind without checks. Fails only when the dimension id is unknown.
    pub fn bind(
        &mut self,
        id: &str,
        key: impl Into<String>,
        column_type: Option<ColumnType>,
    ) -> BindResult<()> {
        self.dimension_mut(id)
            .ok_or_else(|| BindError::UnknownDimension(id.to_string()))?
            .bind(key, column_type);
        Ok(())
    }

    /// Bind after checking the dimension's accepted types and multiplicity.
    pub fn try_bind(
        &mut self,
        id: &str,
        key: impl Into<String>,
        column_type: Option<ColumnType>,
    ) -> BindResult<()> {
        self.dimension_mut(id)
            .ok_or_else(|| BindError::UnknownDimension(id.to_string()))?
            .try_bind(key, column_type)
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        for dimension in &mut self.dimensions.dimensions {
            dimension.clear();
        }
    }

    /// Every dimension has at least its required number of bindings.
    pub fn is_valid(&self) -> bool {
        self.dimensions.iter().all(|d| d.missing() == 0)
    }

    /// What still has to be bound, one sentence per under-bound dimension.
    /// Empty when the instance is valid.
    pub fn instruction(&self) -> String {
        self.dimensions
            .iter()
            .filter(|d| d.missing() > 0)
            .map(|d| {
                let missing = d.missing();
                let noun = if missing > 1 { "dimensions" } else { "dimension" };
                format!("{} requires at least {} more {}", d.title(), missing, noun)
            })
            .collect::<Vec<_>>()
            .join(". ")
    }

    /// Run the mapping over `data`. May be called while invalid; unbound
    /// dimensions degrade the output instead of failing.
    pub fn apply(&self, data: &Dataset) -> AccessorResult<Output> {
        if !self.is_valid() {
            log::warn!("Mapping '{}' with unsatisfied dimensions: {}", self.title(), self.instruction());
        }
        let output = (self.model.map)(data, &self.dimensions)?;
        log::debug!("'{}' mapped {} rows into {} items", self.title(), data.len(), output.len());
        Ok(output)
    }
}
