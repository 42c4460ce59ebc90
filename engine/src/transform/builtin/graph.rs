//! Node-link graph between consecutive step columns.
//!
//! Every pair of adjacent steps contributes one link per distinct
//! (source value, target value) pair. A node is identified by its value
//! together with the step column it came from, so the same text at two
//! steps yields two nodes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dimension::{Accessor, Dimension};
use crate::error::AccessorResult;
use crate::models::{ColumnType, Dataset, Graph, GraphLink, GraphNode, Output};
use crate::transform::grouper::group_by_column;
use crate::transform::model::{DimensionSet, Model};

use super::sum;

pub fn graph() -> Arc<Model> {
    Model::builder()
        .title("Graph")
        .description("Flows between the values of consecutive steps.")
        .dimension(
            "steps",
            Dimension::builder()
                .title("Steps")
                .description("Columns read left to right, one node level each.")
                .required(2)
                .multiple(true)
                .build(),
        )
        .dimension(
            "size",
            Dimension::builder()
                .title("Size")
                .types([ColumnType::Number])
                .accessor(Accessor::number())
                .build(),
        )
        .map(map_graph)
        .build()
}

/// Nodes in creation order, indexed by (name, group).
#[derive(Default)]
struct NodeIndex {
    nodes: Vec<GraphNode>,
    index: HashMap<(String, String), usize>,
}

impl NodeIndex {
    fn resolve(&mut self, name: &str, group: &str) -> usize {
        let key = (name.to_string(), group.to_string());
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        self.nodes.push(GraphNode {
            name: key.0.clone(),
            group: key.1.clone(),
        });
        self.index.insert(key, self.nodes.len() - 1);
        self.nodes.len() - 1
    }

    /// Sort nodes by (group, name) and return the old-to-new position map.
    fn into_sorted(self) -> (Vec<GraphNode>, Vec<usize>) {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by(|&a, &b| {
            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            a.group.cmp(&b.group).then_with(|| a.name.cmp(&b.name))
        });

        let mut position = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            position[old] = new;
        }

        let mut slots: Vec<Option<GraphNode>> = self.nodes.into_iter().map(Some).collect();
        let nodes = order.iter().filter_map(|&old| slots[old].take()).collect();
        (nodes, position)
    }
}

fn map_graph(data: &Dataset, dimensions: &DimensionSet) -> AccessorResult<Output> {
    let steps = match dimensions.bound("steps").and_then(|d| d.bound_keys()) {
        Some(keys) if keys.len() >= 2 => keys,
        _ => return Ok(Output::Graph(Graph::default())),
    };
    let size = dimensions.bound("size");

    let mut nodes = NodeIndex::default();
    let mut links = Vec::new();

    for pair in steps.windows(2) {
        let (source_step, target_step) = (pair[0], pair[1]);

        for source in group_by_column(data, source_step) {
            let si = nodes.resolve(&source.key, source_step);

            for target in group_by_column(source.rows.iter().copied(), target_step) {
                let ti = nodes.resolve(&target.key, target_step);
                let value = match size {
                    Some(size) => sum(size, target.rows.iter().copied())?,
                    None => target.len() as f64,
                };
                links.push(GraphLink {
                    source: si,
                    target: ti,
                    value,
                });
            }
        }
    }

    let (nodes, position) = nodes.into_sorted();
    for link in &mut links {
        link.source = position[link.source];
        link.target = position[link.target];
    }

    log::debug!("Graph has {} nodes and {} links", nodes.len(), links.len());
    Ok(Output::Graph(Graph { nodes, links }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(data: &Dataset, steps: &[&str], size: Option<&str>) -> Graph {
        let mut inst = graph().instance();
        for step in steps {
            inst.bind("steps", *step, Some(ColumnType::String)).unwrap();
        }
        if let Some(size) = size {
            inst.bind("size", size, Some(ColumnType::Number)).unwrap();
        }
        match inst.apply(data).unwrap() {
            Output::Graph(g) => g,
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_pairs_collapse_into_one_link() {
        let data = Dataset::from_records(["From", "To"], vec![vec!["A", "B"], vec!["A", "B"]]).unwrap();
        let g = apply(&data, &["From", "To"], None);

        assert_eq!(
            serde_json::to_value(&g).unwrap(),
            json!({
                "nodes": [{ "name": "A", "group": "From" }, { "name": "B", "group": "To" }],
                "links": [{ "source": 0, "target": 1, "value": 2 }]
            })
        );
    }

    #[test]
    fn test_same_value_at_two_steps_is_two_nodes() {
        let data = Dataset::from_records(
            ["a", "b", "c"],
            vec![vec!["x", "x", "y"], vec!["z", "x", "y"]],
        )
        .unwrap();
        let g = apply(&data, &["a", "b", "c"], None);

        let names: Vec<(&str, &str)> = g
            .nodes
            .iter()
            .map(|n| (n.group.as_str(), n.name.as_str()))
            .collect();
        assert_eq!(names, vec![("a", "x"), ("a", "z"), ("b", "x"), ("c", "y")]);

        // a:x -> b:x, a:z -> b:x, b:x -> c:y (count 2)
        let links: Vec<(usize, usize, f64)> =
            g.links.iter().map(|l| (l.source, l.target, l.value)).collect();
        assert_eq!(links, vec![(0, 2, 1.0), (1, 2, 1.0), (2, 3, 2.0)]);
    }

    #[test]
    fn test_links_follow_sorted_nodes() {
        let data = Dataset::from_records(["From", "To"], vec![vec!["Zed", "Amy"]]).unwrap();
        let g = apply(&data, &["To", "From"], None);
        // "From" sorts before "To", so the source node lands at index 1
        assert_eq!(g.nodes[0], GraphNode { name: "Zed".into(), group: "From".into() });
        assert_eq!(g.links[0].source, 1);
        assert_eq!(g.links[0].target, 0);
    }

    #[test]
    fn test_size_sums_per_pair() {
        let data = Dataset::from_records(
            ["From", "To", "Qty"],
            vec![vec!["A", "B", "2"], vec!["A", "B", "3"], vec!["A", "C", "1"]],
        )
        .unwrap();
        let g = apply(&data, &["From", "To"], Some("Qty"));
        let values: Vec<f64> = g.links.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![5.0, 1.0]);
    }

    #[test]
    fn test_size_sum_skips_non_numeric_cells() {
        let data = Dataset::from_records(
            ["Cat", "Qty"],
            vec![vec!["A", "1"], vec!["A", "2"], vec!["B", "n/a"]],
        )
        .unwrap();
        let g = apply(&data, &["Cat", "Cat"], Some("Qty"));

        assert_eq!(
            serde_json::to_value(&g).unwrap(),
            json!({
                "nodes": [{ "name": "A", "group": "Cat" }, { "name": "B", "group": "Cat" }],
                "links": [
                    { "source": 0, "target": 0, "value": 3 },
                    { "source": 1, "target": 1, "value": 0 }
                ]
            })
        );
    }

    #[test]
    fn test_fewer_than_two_steps_is_empty() {
        let data = Dataset::from_records(["From", "To"], vec![vec!["A", "B"]]).unwrap();
        assert_eq!(apply(&data, &["From"], None), Graph::default());
        assert_eq!(apply(&data, &[], None), Graph::default());
    }
}
