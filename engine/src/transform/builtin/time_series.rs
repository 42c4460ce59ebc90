//! Rows bucketed by group then by date, each bucket rolled up into one
//! record.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::dimension::{Accessor, Dimension};
use crate::error::AccessorResult;
use crate::models::{ColumnType, Dataset, Output, SeriesGroup, SeriesPoint};
use crate::transform::grouper::{group_by_column, Group};
use crate::transform::model::{DimensionSet, Model};

use super::{sum, to_f64};

pub fn time_series() -> Arc<Model> {
    Model::builder()
        .title("Time series")
        .description("One series per group, one aggregated value per date.")
        .dimension("group", Dimension::builder().title("Group").required(1).build())
        .dimension(
            "date",
            Dimension::builder()
                .title("Date")
                .types([ColumnType::Date, ColumnType::Number])
                .accessor(Accessor::timestamp())
                .required(1)
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
        .dimension("color", Dimension::builder().title("Color").build())
        .map(map_time_series)
        .build()
}

fn map_time_series(data: &Dataset, dimensions: &DimensionSet) -> AccessorResult<Output> {
    let Some(group) = dimensions.bound("group") else {
        return Ok(Output::Series(Vec::new()));
    };
    let date = dimensions.bound("date");
    let size = dimensions.bound("size");
    let color = dimensions.bound("color");

    let group_key = group.bindings()[0].key.as_str();
    let date_key = date.map_or("", |d| d.bindings()[0].key.as_str());

    let mut series = Vec::new();
    for bucket in group_by_column(data, group_key) {
        let mut points: Vec<(f64, Group<'_>, SeriesPoint)> = Vec::new();

        for day in group_by_column(bucket.rows.iter().copied(), date_key) {
            let first = day.first();
            let date_value = match date {
                Some(date) => date.value(first)?,
                None => None,
            };
            let order = date_value.as_ref().map_or(f64::NAN, to_f64);
            let point = SeriesPoint {
                size: match size {
                    Some(size) => sum(size, day.rows.iter().copied())?,
                    None => day.len() as f64,
                },
                date: date_value,
                group: group.value(first)?,
                color: match color {
                    Some(color) => color.value(first)?,
                    None => None,
                },
            };
            points.push((order, day, point));
        }

        points.sort_by(|a, b| by_date(a.0, &a.1.key, b.0, &b.1.key));
        series.push(SeriesGroup {
            key: bucket.key,
            values: points.into_iter().map(|(_, _, point)| point).collect(),
        });
    }

    Ok(Output::Series(series))
}

/// Ascending by decoded date, undecodable dates last, raw text on ties.
fn by_date(a: f64, a_key: &str, b: f64, b_key: &str) -> Ordering {
    a.is_nan()
        .cmp(&b.is_nan())
        .then_with(|| a.total_cmp(&b))
        .then_with(|| a_key.cmp(b_key))
}
