//! Transformation module.
//!
//! This module turns a dataset into a model's output shape:
//! - Model: dimension sets, model definitions and instances
//! - Builtin: tree, time series, points, graph and identity models
//! - Grouper: first-seen row grouping shared by the mappings
//! - Pipeline: ingestion plus request-driven mapping

pub mod builtin;
pub mod grouper;
pub mod model;
pub mod pipeline;

pub use model::{DimensionSet, MapFn, Model, ModelBuilder, ModelInstance};
pub use pipeline::*;
