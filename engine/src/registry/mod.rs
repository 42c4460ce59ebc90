//! Model Registry - named lookup of model definitions
//!
//! Built once at startup and passed to whatever needs to resolve a model
//! by name. Instantiating through the registry gives a fresh, unbound
//! [`ModelInstance`] every time.

use std::collections::HashMap;
use std::sync::Arc;

use crate::transform::builtin;
use crate::transform::model::{Model, ModelInstance};

/// Registry of model definitions keyed by name
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    /// Registration order, for listing
    names: Vec<String>,
    /// Loaded models (name -> model)
    models: HashMap<String, Arc<Model>>,
}

impl ModelRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `tree`, `timeSeries`, `points`, `graph` and `identity`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("tree", builtin::tree());
        registry.register("timeSeries", builtin::time_series());
        registry.register("points", builtin::points());
        registry.register("graph", builtin::graph());
        registry.register("identity", builtin::identity());
        registry
    }

    /// Add or replace a model. Replacing keeps the original listing position.
    pub fn register(&mut self, name: impl Into<String>, model: Arc<Model>) {
        let name = name.into();
        if self.models.insert(name.clone(), model).is_none() {
            self.names.push(name);
        } else {
            log::debug!("Replaced model '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Model>> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Models in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Model>)> {
        self.names
            .iter()
            .filter_map(|name| self.models.get(name).map(|m| (name.as_str(), m)))
    }

    /// A fresh instance of the named model
    pub fn instantiate(&self, name: &str) -> Option<ModelInstance> {
        self.get(name).map(|model| model.instance())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;

    #[test]
    fn test_builtins_in_order() {
        let registry = ModelRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["tree", "timeSeries", "points", "graph", "identity"]);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_instantiate_gives_independent_instances() {
        let registry = ModelRegistry::with_builtins();
        let mut a = registry.instantiate("points").unwrap();
        let b = registry.instantiate("points").unwrap();
        a.bind("x", "col", None).unwrap();
        assert!(a.dimension("x").unwrap().is_bound());
        assert!(!b.dimension("x").unwrap().is_bound());
        assert!(registry.instantiate("pie").is_none());
    }

    #[test]
    fn test_register_custom_and_replace() {
        let mut registry = ModelRegistry::new();
        assert!(registry.is_empty());

        registry.register("custom", Model::builder().title("First").build());
        registry.register(
            "custom",
            Model::builder()
                .title("Second")
                .dimension("only", Dimension::builder().required(1).build())
                .build(),
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["custom"]);
        let inst = registry.instantiate("custom").unwrap();
        assert_eq!(inst.title(), "Second");
        assert!(!inst.is_valid());
    }

    #[test]
    fn test_builtin_dimension_constraints() {
        let registry = ModelRegistry::with_builtins();
        let graph = registry.get("graph").unwrap();
        let (id, steps) = graph.dimensions().next().unwrap();
        assert_eq!(id, "steps");
        assert_eq!(steps.required(), 2);
        assert!(steps.multiple());
        assert!(registry.instantiate("identity").unwrap().is_valid());
    }
}
