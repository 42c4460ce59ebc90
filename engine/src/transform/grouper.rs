//! Group rows by a string key, keeping first-seen order.
//!
//! ```text
//! rows                          groups
//! ┌───────────────────┐       ┌──────────────────────┐
//! │ From: A, To: B    │       │ A ─▶ [row 0, row 2]  │
//! │ From: C, To: B    │  →    ├──────────────────────┤
//! │ From: A, To: D    │       │ C ─▶ [row 1]         │
//! └───────────────────┘       └──────────────────────┘
//! ```
//!
//! Grouping twice (outer key, then inner key per group) gives the nested
//! buckets the time series and graph mappings aggregate over.

use std::collections::HashMap;

use crate::models::Row;

/// Rows sharing one key, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: String,
    pub rows: Vec<&'a Row>,
}

impl<'a> Group<'a> {
    pub fn first(&self) -> &'a Row {
        self.rows[0]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Partition `rows` by `key`. Groups appear in the order their key is
/// first met; every group holds at least one row.
pub fn group_rows<'a, I, F>(rows: I, key: F) -> Vec<Group<'a>>
where
    I: IntoIterator<Item = &'a Row>,
    F: Fn(&Row) -> String,
{
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let k = key(row);
        match index.get(&k) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push(Group {
                    key: k,
                    rows: vec![row],
                });
            }
        }
    }

    groups
}

/// Group by the raw text of column `column`. Rows without the column
/// fall into the `""` group.
pub fn group_by_column<'a, I>(rows: I, column: &str) -> Vec<Group<'a>>
where
    I: IntoIterator<Item = &'a Row>,
{
    group_rows(rows, |row| row.get(column).unwrap_or("").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;

    #[test]
    fn test_first_seen_order() {
        let data = Dataset::from_records(
            ["From", "To"],
            vec![vec!["A", "B"], vec!["C", "B"], vec!["A", "D"]],
        )
        .unwrap();

        let groups = group_by_column(&data, "From");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "A");
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].rows[1].get("To"), Some("D"));
        assert_eq!(groups[1].key, "C");
        assert_eq!(groups[1].first().get("To"), Some("B"));
    }

    #[test]
    fn test_nested_grouping() {
        let data = Dataset::from_records(
            ["g", "d"],
            vec![vec!["x", "1"], vec!["x", "1"], vec!["x", "2"], vec!["y", "1"]],
        )
        .unwrap();

        let outer = group_by_column(&data, "g");
        let inner = group_by_column(outer[0].rows.iter().copied(), "d");
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0].len(), 2);
        assert_eq!(inner[1].len(), 1);
    }

    #[test]
    fn test_missing_column_single_group() {
        let data = Dataset::from_records(["a"], vec![vec!["1"], vec!["2"]]).unwrap();
        let groups = group_by_column(&data, "nope");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "");
        assert_eq!(groups[0].len(), 2);
    }
}
