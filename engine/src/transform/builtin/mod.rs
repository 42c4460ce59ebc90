//! Built-in models.
//!
//! | name         | dimensions                                   | output            |
//! |--------------|----------------------------------------------|-------------------|
//! | `tree`       | hierarchy*, size, color, label               | [`TreeNode`]      |
//! | `timeSeries` | group*, date*, size, color                   | [`SeriesGroup`]s  |
//! | `points`     | x*, y*, size, color, label                   | [`Point`]s        |
//! | `graph`      | steps* (2+), size                            | [`Graph`]         |
//! | `identity`   | none                                         | the dataset       |
//!
//! `*` marks required dimensions.
//!
//! [`TreeNode`]: crate::models::TreeNode
//! [`SeriesGroup`]: crate::models::SeriesGroup
//! [`Point`]: crate::models::Point
//! [`Graph`]: crate::models::Graph

mod graph;
mod points;
mod time_series;
mod tree;

use std::sync::Arc;

use crate::dimension::DimensionInstance;
use crate::error::AccessorResult;
use crate::models::{Datum, Row};
use crate::sniffer::{parse_numeric, to_epoch_millis};
use crate::transform::model::Model;

pub use graph::graph;
pub use points::points;
pub use time_series::time_series;
pub use tree::tree;

/// A model without dimensions that returns its input.
pub fn identity() -> Arc<Model> {
    Model::builder().title("Identity").build()
}

/// Numeric reading of an accessor result.
pub(crate) fn to_f64(datum: &Datum) -> f64 {
    match datum {
        Datum::Number(n) => *n,
        Datum::Text(s) => parse_numeric(s).unwrap_or(f64::NAN),
        Datum::Date(d) => to_epoch_millis(d) as f64,
    }
}

/// Sum of the dimension's numeric values over `rows`, skipping values
/// that are not numbers.
pub(crate) fn sum<'a>(
    dimension: &DimensionInstance,
    rows: impl IntoIterator<Item = &'a Row>,
) -> AccessorResult<f64> {
    let mut total = 0.0;
    for row in rows {
        let value = dimension.value(row)?.map_or(f64::NAN, |d| to_f64(&d));
        if !value.is_nan() {
            total += value;
        }
    }
    Ok(total)
}

/// `size` of one row: the bound value, or 1 when unbound.
pub(crate) fn size_or_one(size: Option<&DimensionInstance>, row: &Row) -> AccessorResult<f64> {
    match size {
        Some(size) => Ok(size.value(row)?.map_or(f64::NAN, |d| to_f64(&d))),
        None => Ok(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, Output};

    #[test]
    fn test_identity_returns_input() {
        let data = Dataset::from_records(
            ["a", "b"],
            vec![vec!["1", "x"], vec!["2", "y"]],
        )
        .unwrap();
        let out = identity().instance().apply(&data).unwrap();
        assert_eq!(out.as_rows(), Some(&data));
        assert_eq!(out, Output::Rows(data));
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(&Datum::Number(2.0)), 2.0);
        assert_eq!(to_f64(&Datum::Text(" 3 ".into())), 3.0);
        assert!(to_f64(&Datum::Text("abc".into())).is_nan());
    }
}
