//! Data profiling module for dataset analysis.
//!
//! This module provides the profiling engine:
//! - Per-column summaries (type, missingness, cardinality, numeric moments)
//! - Missingness tables
//! - Pairwise Pearson correlation over numeric columns
//! - Top-k category frequencies
//!
//! Every function here is pure: it reads an immutable [`Table`] and returns
//! a fresh value. Degenerate input (no rows, no numeric columns) yields
//! empty or absent results rather than errors.

mod categories;
mod correlation;
mod missingness;
mod statistics;

pub use categories::{
    CategoryFrequencyAnalyzer, DEFAULT_MAX_CATEGORY_COLUMNS, DEFAULT_TOP_K, top_categories,
};
pub use correlation::{CorrelationAnalyzer, compute_correlation};
pub use missingness::{MissingnessAnalyzer, analyze_missingness};

use crate::table::{Column, ColumnData, Table};
use crate::types::{ColumnSummary, DatasetSummary};
use crate::utils::ratio;
use statistics::{distinct_key, numeric_moments};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Number of example values kept per column.
pub const EXAMPLE_VALUES: usize = 3;

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire dataset, one summary per column in table order.
    pub fn profile_dataset(table: &Table) -> DatasetSummary {
        let row_count = table.row_count();
        let columns: Vec<ColumnSummary> = table
            .columns()
            .iter()
            .map(|column| Self::profile_column(column, row_count))
            .collect();

        debug!(
            "Profiled {} columns over {} rows",
            columns.len(),
            row_count
        );

        DatasetSummary {
            row_count,
            column_count: table.column_count(),
            columns,
        }
    }

    /// Profile a single column.
    pub fn profile_column(column: &Column, row_count: usize) -> ColumnSummary {
        let missing_count = column.missing_count();
        let non_null_count = column.len() - missing_count;

        let mut summary = ColumnSummary {
            name: column.name().to_string(),
            declared_type: column.declared_type().to_string(),
            non_null_count,
            missing_count,
            missing_share: ratio(missing_count, row_count),
            unique_count: 0,
            example_values: Vec::new(),
            is_numeric: column.is_numeric(),
            zero_count: 0,
            min: None,
            max: None,
            mean: None,
            std_dev: None,
        };

        match column.data() {
            ColumnData::Integer(values) => {
                let present: Vec<i128> = values.iter().flatten().copied().collect();

                let (unique_count, examples) =
                    distinct_in_order(present.iter().map(|&v| (v, v)));
                summary.unique_count = unique_count;
                summary.example_values = examples.iter().map(i128::to_string).collect();
                summary.zero_count = present.iter().filter(|&&v| v == 0).count();

                let floats: Vec<f64> = present.iter().map(|&v| v as f64).collect();
                summary.set_moments(&floats);
            }
            ColumnData::Numeric { values, repr } => {
                let present: Vec<f64> = values.iter().flatten().copied().collect();

                let (unique_count, examples) =
                    distinct_in_order(present.iter().map(|&v| (distinct_key(v), v)));
                summary.unique_count = unique_count;
                summary.example_values = examples.into_iter().map(|v| repr.format(v)).collect();
                summary.zero_count = present.iter().filter(|&&v| v == 0.0).count();
                summary.set_moments(&present);
            }
            ColumnData::Text(values) => {
                let (unique_count, examples) =
                    distinct_in_order(values.iter().flatten().map(|v| (v.as_str(), v)));
                summary.unique_count = unique_count;
                summary.example_values = examples.into_iter().cloned().collect();
            }
            ColumnData::Empty(_) => {}
        }

        summary
    }
}

impl ColumnSummary {
    fn set_moments(&mut self, values: &[f64]) {
        if let Some(moments) = numeric_moments(values) {
            self.min = Some(moments.min);
            self.max = Some(moments.max);
            self.mean = Some(moments.mean);
            self.std_dev = moments.std_dev;
        }
    }
}

/// Profile an entire dataset.
pub fn profile_dataset(table: &Table) -> DatasetSummary {
    DataProfiler::profile_dataset(table)
}

/// Profile a single column of a table with `row_count` rows.
pub fn profile_column(column: &Column, row_count: usize) -> ColumnSummary {
    DataProfiler::profile_column(column, row_count)
}

/// Count distinct keys and keep the first [`EXAMPLE_VALUES`] distinct items.
fn distinct_in_order<K, V, I>(items: I) -> (usize, Vec<V>)
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    let mut seen = HashSet::new();
    let mut examples = Vec::with_capacity(EXAMPLE_VALUES);
    for (key, value) in items {
        if seen.insert(key) && examples.len() < EXAMPLE_VALUES {
            examples.push(value);
        }
    }
    (seen.len(), examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_table() -> Table {
        Table::builder()
            .integer("age", [Some(10), Some(20), Some(30), None])
            .integer("height", [Some(140), Some(150), Some(160), Some(170)])
            .text("city", [Some("A"), Some("B"), Some("A"), None])
            .build()
            .unwrap()
    }

    // ==================== profile_dataset tests ====================

    #[test]
    fn test_profile_dataset_shape() {
        let summary = profile_dataset(&sample_table());

        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.column_count, 3);
        let names: Vec<&str> = summary.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["age", "height", "city"]);
    }

    #[test]
    fn test_profile_numeric_column() {
        let summary = profile_dataset(&sample_table());
        let age = summary.column("age").unwrap();

        assert_eq!(age.declared_type, "i64");
        assert!(age.is_numeric);
        assert_eq!(age.non_null_count, 3);
        assert_eq!(age.missing_count, 1);
        assert_eq!(age.missing_share, 0.25);
        assert_eq!(age.unique_count, 3);
        assert_eq!(age.example_values, vec!["10", "20", "30"]);
        assert_eq!(age.min, Some(10.0));
        assert_eq!(age.max, Some(30.0));
        assert_eq!(age.mean, Some(20.0));
        assert_eq!(age.std_dev, Some(10.0));
    }

    #[test]
    fn test_profile_text_column() {
        let summary = profile_dataset(&sample_table());
        let city = summary.column("city").unwrap();

        assert!(!city.is_numeric);
        assert_eq!(city.unique_count, 2);
        assert_eq!(city.example_values, vec!["A", "B"]);
        assert_eq!(city.zero_count, 0);
        assert_eq!(city.min, None);
        assert_eq!(city.mean, None);
        assert_eq!(city.std_dev, None);
    }

    #[test]
    fn test_profile_counts_are_conserved() {
        let summary = profile_dataset(&sample_table());
        for column in &summary.columns {
            assert_eq!(
                column.non_null_count + column.missing_count,
                summary.row_count,
                "column {}",
                column.name
            );
        }
    }

    #[test]
    fn test_profile_empty_table() {
        let table = Table::builder()
            .integer("a", Vec::<Option<i64>>::new())
            .text("b", Vec::<Option<&str>>::new())
            .build()
            .unwrap();
        let summary = profile_dataset(&table);

        assert_eq!(summary.row_count, 0);
        for column in &summary.columns {
            assert_eq!(column.missing_share, 0.0);
            assert_eq!(column.min, None);
        }
    }

    // ==================== profile_column tests ====================

    #[test]
    fn test_single_value_has_no_std() {
        let table = Table::builder()
            .numeric("x", [Some(3.5), None])
            .build()
            .unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert_eq!(summary.mean, Some(3.5));
        assert_eq!(summary.std_dev, None);
    }

    #[test]
    fn test_all_missing_numeric_has_no_moments() {
        let table = Table::builder()
            .numeric("x", [None, None])
            .build()
            .unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert!(summary.is_numeric);
        assert_eq!(summary.non_null_count, 0);
        assert_eq!(summary.missing_share, 1.0);
        assert_eq!(summary.min, None);
        assert_eq!(summary.max, None);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.std_dev, None);
    }

    #[test]
    fn test_zero_count_and_signed_zero() {
        let table = Table::builder()
            .numeric("x", [Some(0.0), Some(-0.0), Some(1.0), None])
            .build()
            .unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert_eq!(summary.zero_count, 2);
        assert_eq!(summary.unique_count, 2);
    }

    #[test]
    fn test_examples_capped_at_three() {
        let table = Table::builder()
            .text("t", ["d", "c", "d", "b", "a"].map(Some))
            .build()
            .unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert_eq!(summary.unique_count, 4);
        assert_eq!(summary.example_values, vec!["d", "c", "b"]);
    }

    #[test]
    fn test_boolean_column_is_numeric() {
        let table = Table::builder()
            .boolean("flag", [Some(true), Some(false), Some(false)])
            .build()
            .unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert!(summary.is_numeric);
        assert_eq!(summary.zero_count, 2);
        assert_eq!(summary.example_values, vec!["true", "false"]);
    }

    #[test]
    fn test_integers_beyond_f64_precision_are_distinct() {
        let table = Table::builder()
            .integer(
                "user_id",
                [Some(9_007_199_254_740_992), Some(9_007_199_254_740_993)],
            )
            .build()
            .unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert_eq!(summary.unique_count, 2);
        assert_eq!(
            summary.example_values,
            vec!["9007199254740992", "9007199254740993"]
        );
    }

    #[test]
    fn test_empty_kind_column() {
        let table = Table::builder().empty("notes", 3).build().unwrap();
        let summary = profile_column(&table.columns()[0], table.row_count());

        assert!(!summary.is_numeric);
        assert_eq!(summary.missing_count, 3);
        assert_eq!(summary.unique_count, 0);
        assert!(summary.example_values.is_empty());
    }

    #[test]
    fn test_profiling_is_idempotent() {
        let table = sample_table();
        assert_eq!(profile_dataset(&table), profile_dataset(&table));
    }
}
