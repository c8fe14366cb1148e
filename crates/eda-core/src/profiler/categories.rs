//! Top-k value frequencies for text and categorical columns.

use crate::table::Table;
use crate::types::{CategoryCount, CategoryFrequencyTable, ColumnCategories};
use std::collections::HashMap;

/// Default number of columns profiled by [`top_categories`].
pub const DEFAULT_MAX_CATEGORY_COLUMNS: usize = 5;

/// Default number of values kept per column.
pub const DEFAULT_TOP_K: usize = 5;

/// Counts value frequencies over eligible columns.
pub struct CategoryFrequencyAnalyzer;

impl CategoryFrequencyAnalyzer {
    /// Frequency tables for the first `max_columns` categorical columns.
    ///
    /// Values are sorted by descending count; equal counts keep the order in
    /// which the values first appear. `share` is relative to the returned
    /// values only. Columns with no values to report are omitted.
    pub fn analyze(table: &Table, max_columns: usize, top_k: usize) -> CategoryFrequencyTable {
        let columns = table
            .columns()
            .iter()
            .filter(|c| c.is_categorical())
            .take(max_columns)
            .filter_map(|column| {
                let values = column.text_values()?;
                let top = Self::top_values(values, top_k);
                if top.is_empty() {
                    return None;
                }
                Some(ColumnCategories {
                    column: column.name().to_string(),
                    values: top,
                })
            })
            .collect();

        CategoryFrequencyTable { columns }
    }

    fn top_values(values: &[Option<String>], top_k: usize) -> Vec<CategoryCount> {
        // Distinct values in first-occurrence order with their counts
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for value in values.iter().flatten() {
            let i = *index.entry(value.as_str()).or_insert_with(|| {
                counts.push((value.as_str(), 0));
                counts.len() - 1
            });
            counts[i].1 += 1;
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(top_k);

        let total: usize = counts.iter().map(|(_, count)| count).sum();
        counts
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value: value.to_string(),
                count,
                share: count as f64 / total as f64,
            })
            .collect()
    }
}

/// Top-k category frequencies, capped at `max_columns` eligible columns.
pub fn top_categories(table: &Table, max_columns: usize, top_k: usize) -> CategoryFrequencyTable {
    CategoryFrequencyAnalyzer::analyze(table, max_columns, top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn city_table() -> Table {
        Table::builder()
            .integer("age", [Some(10), Some(20), Some(30), None])
            .text("city", [Some("A"), Some("B"), Some("A"), None])
            .build()
            .unwrap()
    }

    #[test]
    fn test_top_two_cities() {
        let cats = top_categories(&city_table(), 5, 2);
        let city = cats.get("city").unwrap();

        assert_eq!(city.len(), 2);
        assert_eq!(city[0].value, "A");
        assert_eq!(city[0].count, 2);
        assert!((city[0].share - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(city[1].value, "B");
        assert_eq!(city[1].count, 1);
        assert!((city[1].share - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_columns_are_not_eligible() {
        let cats = top_categories(&city_table(), 5, 5);
        assert!(cats.get("age").is_none());
        assert_eq!(cats.len(), 1);
    }

    #[test]
    fn test_share_is_relative_to_returned_values() {
        let table = Table::builder()
            .text("t", ["a", "a", "a", "b", "b", "c"].map(Some))
            .build()
            .unwrap();

        let cats = top_categories(&table, 5, 2);
        let t = cats.get("t").unwrap();
        assert_eq!(t.len(), 2);
        assert!((t[0].share - 0.6).abs() < 1e-12);
        assert!((t[1].share - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let table = Table::builder()
            .text("t", ["z", "y", "x", "y", "z", "x"].map(Some))
            .build()
            .unwrap();

        let cats = top_categories(&table, 5, 3);
        let order: Vec<&str> = cats
            .get("t")
            .unwrap()
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(order, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_fewer_distinct_values_than_top_k() {
        let cats = top_categories(&city_table(), 5, 10);
        assert_eq!(cats.get("city").unwrap().len(), 2);
    }

    #[test]
    fn test_max_columns_caps_eligible_columns() {
        let table = Table::builder()
            .integer("n", [Some(1)])
            .text("a", [Some("x")])
            .text("b", [Some("y")])
            .text("c", [Some("z")])
            .build()
            .unwrap();

        let cats = top_categories(&table, 2, 5);
        let names: Vec<&str> = cats.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(top_categories(&table, 0, 5).is_empty());
    }

    #[test]
    fn test_all_missing_column_is_omitted() {
        let table = Table::builder()
            .text("blank", [None::<&str>, None])
            .text("ok", [Some("v"), None])
            .build()
            .unwrap();

        let cats = top_categories(&table, 5, 5);
        assert!(cats.get("blank").is_none());
        assert!(cats.get("ok").is_some());
    }

    #[test]
    fn test_zero_top_k_yields_nothing() {
        assert!(top_categories(&city_table(), 5, 0).is_empty());
    }
}
