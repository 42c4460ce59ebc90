//! Output shapes handed to the rendering side.
//!
//! Optional fields that a mapping could not fill (unbound dimensions) are
//! omitted from the JSON rather than written as `null`.

use serde::Serialize;

use super::{serialize_number, serialize_opt_number, ColumnType, Dataset, Datum};

/// A node of the hierarchy built by the tree mapping.
///
/// Leaves carry `size` and no `children`; branches carry `children`. The
/// root has neither `name` nor `class`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TreeNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ColumnType>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_number"
    )]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// An empty root: no name, an empty child list.
    pub fn root() -> Self {
        Self {
            children: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub(crate) fn branch(name: &str, class: Option<ColumnType>) -> Self {
        Self {
            name: Some(name.to_string()),
            class,
            children: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children
            .as_ref()?
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }
}

/// One aggregated bucket of a time series group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    #[serde(serialize_with = "serialize_number")]
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Datum>,
}

/// All buckets sharing a group value, ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesGroup {
    pub key: String,
    pub values: Vec<SeriesPoint>,
}

/// One record of the points mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Datum>,
    #[serde(serialize_with = "serialize_number")]
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Vec<Datum>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub group: String,
}

/// Directed link between two positions of [`Graph::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    #[serde(serialize_with = "serialize_number")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Result of applying a model to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Output {
    Rows(Dataset),
    Tree(TreeNode),
    Series(Vec<SeriesGroup>),
    Points(Vec<Point>),
    Graph(Graph),
}

impl Output {
    pub fn as_rows(&self) -> Option<&Dataset> {
        match self {
            Self::Rows(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&TreeNode> {
        match self {
            Self::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[SeriesGroup]> {
        match self {
            Self::Series(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_points(&self) -> Option<&[Point]> {
        match self {
            Self::Points(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_graph(&self) -> Option<&Graph> {
        match self {
            Self::Graph(g) => Some(g),
            _ => None,
        }
    }

    /// Number of top-level items, for log lines.
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(d) => d.len(),
            Self::Tree(t) => t.children.as_ref().map_or(0, Vec::len),
            Self::Series(s) => s.len(),
            Self::Points(p) => p.len(),
            Self::Graph(g) => g.nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
