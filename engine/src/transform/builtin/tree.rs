//! Hierarchy of nested nodes sized by row count or a numeric column.

use std::sync::Arc;

use crate::dimension::{Accessor, Dimension};
use crate::error::AccessorResult;
use crate::models::{ColumnType, Dataset, Output, TreeNode};
use crate::transform::model::{DimensionSet, Model};

use super::size_or_one;

pub fn tree() -> Arc<Model> {
    Model::builder()
        .title("Tree")
        .description("Nested categories, one level per hierarchy column.")
        .dimension(
            "hierarchy",
            Dimension::builder()
                .title("Hierarchy")
                .description("Columns forming the levels of the tree, outermost first.")
                .required(1)
                .multiple(true)
                .build(),
        )
        .dimension(
            "size",
            Dimension::builder()
                .title("Size")
                .description("Numeric value summed at each leaf. Defaults to a row count.")
                .types([ColumnType::Number])
                .accessor(Accessor::number())
                .build(),
        )
        .dimension("color", Dimension::builder().title("Color").build())
        .dimension(
            "label",
            Dimension::builder().title("Label").multiple(true).build(),
        )
        .map(map_tree)
        .build()
}

fn map_tree(data: &Dataset, dimensions: &DimensionSet) -> AccessorResult<Output> {
    let mut root = TreeNode::root();

    let Some(hierarchy) = dimensions.bound("hierarchy") else {
        return Ok(Output::Tree(root));
    };
    let size = dimensions.bound("size");
    let color = dimensions.bound("color");
    let label = dimensions.bound("label");

    let classes: Vec<Option<ColumnType>> =
        hierarchy.bindings().iter().map(|b| b.column_type).collect();

    for row in data {
        let path: Vec<String> = hierarchy
            .values(row)?
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect();
        if path.is_empty() {
            continue;
        }

        let leaf = seek(&mut root, &path, &classes);

        // a NaN running size restarts from zero
        let current = leaf.size.filter(|s| !s.is_nan()).unwrap_or(0.0);
        leaf.size = Some(current + size_or_one(size, row)?);
        leaf.color = match color {
            Some(color) => color.value(row)?,
            None => None,
        };
        leaf.label = match label {
            Some(label) => label.values(row)?,
            None => None,
        };
        leaf.children = None;
    }

    Ok(Output::Tree(root))
}

/// Walk `path` down from `node`, creating missing children.
///
/// Blank segments do not create a level: the walk stays on the current
/// node and moves on to the next segment and class.
fn seek<'a>(
    node: &'a mut TreeNode,
    path: &[String],
    classes: &[Option<ColumnType>],
) -> &'a mut TreeNode {
    let Some((segment, rest)) = path.split_first() else {
        return node;
    };
    let class = classes.first().copied().flatten();
    let rest_classes = classes.get(1..).unwrap_or(&[]);

    let children = node.children.get_or_insert_with(Vec::new);
    let index = match children
        .iter()
        .position(|c| c.name.as_deref() == Some(segment.as_str()))
    {
        Some(i) => Some(i),
        None if segment.chars().all(char::is_whitespace) => None,
        None => {
            children.push(TreeNode::branch(segment, class));
            Some(children.len() - 1)
        }
    };

    match index {
        Some(i) => {
            let children = node.children.get_or_insert_with(Vec::new);
            seek(&mut children[i], rest, rest_classes)
        }
        None => seek(node, rest, rest_classes),
    }
}
