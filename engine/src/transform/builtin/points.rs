//! One point per row.

use std::sync::Arc;

use crate::dimension::{Accessor, Dimension};
use crate::error::AccessorResult;
use crate::models::{ColumnType, Dataset, Output, Point};
use crate::transform::model::{DimensionSet, Model};

use super::size_or_one;

fn axis(title: &str) -> Arc<Dimension> {
    Dimension::builder()
        .title(title)
        .types([ColumnType::Number, ColumnType::Date])
        .accessor(Accessor::date_or_number())
        .required(1)
        .build()
}

pub fn points() -> Arc<Model> {
    Model::builder()
        .title("Points")
        .description("Rows placed on two numeric or date axes.")
        .dimension("x", axis("X Axis"))
        .dimension("y", axis("Y Axis"))
        .dimension(
            "size",
            Dimension::builder()
                .title("Size")
                .types([ColumnType::Number])
                .accessor(Accessor::number())
                .build(),
        )
        .dimension("color", Dimension::builder().title("Color").build())
        .dimension(
            "label",
            Dimension::builder().title("Label").multiple(true).build(),
        )
        .map(map_points)
        .build()
}

fn map_points(data: &Dataset, dimensions: &DimensionSet) -> AccessorResult<Output> {
    let x = dimensions.bound("x");
    let y = dimensions.bound("y");
    let size = dimensions.bound("size");
    let color = dimensions.bound("color");
    let label = dimensions.bound("label");

    let mut points = Vec::with_capacity(data.len());
    for row in data {
        points.push(Point {
            x: match x {
                Some(x) => x.value(row)?,
                None => None,
            },
            y: match y {
                Some(y) => y.value(row)?,
                None => None,
            },
            size: size_or_one(size, row)?,
            color: match color {
                Some(color) => color.value(row)?,
                None => None,
            },
            label: match label {
                Some(label) => label.values(row)?,
                None => None,
            },
        });
    }

    Ok(Output::Points(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Datum;
    use serde_json::json;

    fn data() -> Dataset {
        Dataset::from_records(
            ["when", "score", "weight", "name"],
            vec![
                vec!["2020-05-01", "3", "10", "a"],
                vec!["2020-05-02", "4.5", "", "b"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_one_point_per_row_with_default_size() {
        let mut inst = points().instance();
        inst.bind("x", "score", Some(ColumnType::Number)).unwrap();
        inst.bind("y", "score", Some(ColumnType::Number)).unwrap();
        let out = inst.apply(&data()).unwrap();
        let pts = out.as_points().unwrap();

        assert_eq!(pts.len(), 2);
        assert!(pts.iter().all(|p| p.size == 1.0));
        assert_eq!(pts[1].x, Some(Datum::Number(4.5)));
        assert!(pts[0].label.is_none());
    }

    #[test]
    fn test_date_axis_and_bound_size() {
        let mut inst = points().instance();
        inst.bind("x", "when", Some(ColumnType::Date)).unwrap();
        inst.bind("y", "score", Some(ColumnType::Number)).unwrap();
        inst.bind("size", "weight", Some(ColumnType::Number)).unwrap();
        inst.bind("label", "name", Some(ColumnType::String)).unwrap();
        let out = inst.apply(&data()).unwrap();

        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!([
                { "x": "2020-05-01T00:00:00.000Z", "y": 3, "size": 10, "label": ["a"] },
                { "x": "2020-05-02T00:00:00.000Z", "y": 4.5, "size": 0, "label": ["b"] }
            ])
        );
    }

    #[test]
    fn test_bad_cells_read_as_null() {
        let data = Dataset::from_records(
            ["when", "score", "weight"],
            vec![vec!["someday", "n/a", "heavy"]],
        )
        .unwrap();
        let mut inst = points().instance();
        inst.bind("x", "when", Some(ColumnType::Date)).unwrap();
        inst.bind("y", "score", Some(ColumnType::Number)).unwrap();
        inst.bind("size", "weight", Some(ColumnType::Number)).unwrap();
        let out = inst.apply(&data).unwrap();

        assert!(out.as_points().unwrap()[0].size.is_nan());
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!([{ "x": null, "y": null, "size": null }])
        );
    }

    #[test]
    fn test_unbound_axes_are_omitted() {
        let out = points().instance().apply(&data()).unwrap();
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!([{ "size": 1 }, { "size": 1 }])
        );
    }
}
