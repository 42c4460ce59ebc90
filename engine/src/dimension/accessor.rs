//! Conversion functions from raw cell text to [`Datum`].

use std::fmt;
use std::sync::Arc;

use crate::error::AccessorResult;
use crate::models::{ColumnType, Datum};
use crate::sniffer::{decode_date, parse_numeric, to_epoch_millis};

type AccessorFn = dyn Fn(&str, Option<ColumnType>) -> AccessorResult<Datum> + Send + Sync;

/// Converts a cell of a bound column. Receives the raw text and the
/// sniffed type of the column it came from.
#[derive(Clone)]
pub struct Accessor {
    name: &'static str,
    f: Arc<AccessorFn>,
}

impl Accessor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, Option<ColumnType>) -> AccessorResult<Datum> + Send + Sync + 'static,
    {
        Self::named("custom", f)
    }

    fn named<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&str, Option<ColumnType>) -> AccessorResult<Datum> + Send + Sync + 'static,
    {
        Self { name, f: Arc::new(f) }
    }

    /// Raw text, unchanged.
    pub fn text() -> Self {
        Self::named("text", |value, _| Ok(Datum::Text(value.to_string())))
    }

    /// Numeric literal. A blank cell reads as zero and anything else that
    /// is not a number reads as NaN.
    pub fn number() -> Self {
        Self::named("number", |value, _| Ok(Datum::Number(to_number(value))))
    }

    /// Milliseconds since the epoch for Date columns, a number otherwise.
    pub fn timestamp() -> Self {
        Self::named("timestamp", |value, column_type| match column_type {
            Some(ColumnType::Date) => Ok(Datum::Number(
                to_date(value).map_or(f64::NAN, |d| to_epoch_millis(&d) as f64),
            )),
            _ => Ok(Datum::Number(to_number(value))),
        })
    }

    /// A date value for Date columns, a number otherwise. An undecodable
    /// date reads as NaN.
    pub fn date_or_number() -> Self {
        Self::named("date_or_number", |value, column_type| match column_type {
            Some(ColumnType::Date) => Ok(to_date(value).map_or(Datum::Number(f64::NAN), Datum::Date)),
            _ => Ok(Datum::Number(to_number(value))),
        })
    }

    pub fn apply(&self, value: &str, column_type: Option<ColumnType>) -> AccessorResult<Datum> {
        (self.f)(value, column_type)
    }
}

impl Default for Accessor {
    fn default() -> Self {
        Self::text()
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor({})", self.name)
    }
}

fn to_number(value: &str) -> f64 {
    parse_numeric(value).unwrap_or(f64::NAN)
}

/// `None` for blank or undecodable cells.
fn to_date(value: &str) -> Option<chrono::NaiveDateTime> {
    if value.trim().is_empty() {
        return None;
    }
    decode_date(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_identity() {
        let d = Accessor::text().apply(" Fruit ", Some(ColumnType::String)).unwrap();
        assert_eq!(d, Datum::Text(" Fruit ".into()));
    }

    #[test]
    fn test_number_accessor() {
        assert_eq!(Accessor::number().apply("2.5", None).unwrap(), Datum::Number(2.5));
        assert_eq!(Accessor::number().apply("", None).unwrap(), Datum::Number(0.0));
    }

    #[test]
    fn test_number_accessor_reads_bad_cells_as_nan() {
        for cell in ["abc", "n/a", "12abc", "0x+1"] {
            match Accessor::number().apply(cell, Some(ColumnType::Number)).unwrap() {
                Datum::Number(n) => assert!(n.is_nan(), "{} read as {}", cell, n),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_timestamp_branches_on_column_type() {
        let ts = Accessor::timestamp();
        assert_eq!(
            ts.apply("1970-01-02", Some(ColumnType::Date)).unwrap(),
            Datum::Number(86_400_000.0)
        );
        assert_eq!(ts.apply("1999", Some(ColumnType::Number)).unwrap(), Datum::Number(1999.0));
        match ts.apply("soon", Some(ColumnType::Date)).unwrap() {
            Datum::Number(n) => assert!(n.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
        match ts.apply("n/a", Some(ColumnType::Number)).unwrap() {
            Datum::Number(n) => assert!(n.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_date_or_number() {
        let acc = Accessor::date_or_number();
        assert!(matches!(
            acc.apply("2020-05-01", Some(ColumnType::Date)).unwrap(),
            Datum::Date(_)
        ));
        assert_eq!(acc.apply("7", Some(ColumnType::Number)).unwrap(), Datum::Number(7.0));
        for cell in ["", "someday"] {
            match acc.apply(cell, Some(ColumnType::Date)).unwrap() {
                Datum::Number(n) => assert!(n.is_nan()),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_custom_accessor() {
        let upper = Accessor::new(|v, _| Ok(Datum::Text(v.to_uppercase())));
        assert_eq!(upper.apply("veg", None).unwrap(), Datum::Text("VEG".into()));
        assert_eq!(format!("{:?}", upper), "Accessor(custom)");
    }

    #[test]
    fn test_custom_accessor_can_fail() {
        let strict = Accessor::new(|v, _| {
            parse_numeric(v)
                .map(Datum::Number)
                .ok_or_else(|| crate::error::AccessorError::new(v, "not a number"))
        });
        assert_eq!(strict.apply("4", None).unwrap(), Datum::Number(4.0));
        assert_eq!(strict.apply("n/a", None).unwrap_err().value, "n/a");
    }
}
