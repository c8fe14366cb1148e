use crate::config::QualityThresholds;
use crate::types::{
    ColumnIssue, DatasetSummary, JsonSummary, MissingnessTable, ProblematicColumn, QualityReport,
};
use crate::utils::ratio;
use std::collections::BTreeMap;
use tracing::debug;

/// Penalty for a dataset with too few rows.
pub const FEW_ROWS_PENALTY: f64 = 0.2;

/// Penalty for each of the remaining binary rules.
pub const RULE_PENALTY: f64 = 0.1;

/// Minimum score at which a dataset is considered fit for modelling.
pub const READINESS_THRESHOLD: f64 = 0.7;

pub struct QualityScorer;

impl QualityScorer {
    /// Apply every heuristic rule in order and clamp the final score.
    ///
    /// Penalties stack; several rules can fire on the same run.
    pub fn score(
        summary: &DatasetSummary,
        missingness: &MissingnessTable,
        thresholds: &QualityThresholds,
    ) -> QualityReport {
        let mut score = 1.0;
        let row_count = summary.row_count;

        let too_few_rows = row_count < thresholds.min_rows;
        if too_few_rows {
            score -= FEW_ROWS_PENALTY;
        }

        let too_many_columns = summary.column_count > thresholds.max_columns;
        if too_many_columns {
            score -= RULE_PENALTY;
        }

        // Proportional penalty: the raw share is subtracted
        let max_missing_share = missingness.max_share();
        let too_many_missing = max_missing_share > thresholds.max_missing_share;
        if too_many_missing {
            score -= max_missing_share;
        }
        let high_missing_columns = missingness
            .iter()
            .filter(|e| e.missing_share > thresholds.max_missing_share)
            .map(|e| e.column.clone())
            .collect();

        let constant_columns: Vec<String> = summary
            .columns
            .iter()
            .filter(|c| c.unique_count <= 1 && c.non_null_count > 0)
            .map(|c| c.name.clone())
            .collect();
        if !constant_columns.is_empty() {
            score -= RULE_PENALTY;
        }

        let high_cardinality_categoricals: Vec<String> = summary
            .columns
            .iter()
            .filter(|c| {
                !c.is_numeric
                    && row_count > 0
                    && ratio(c.unique_count, row_count) > thresholds.high_cardinality_ratio
            })
            .map(|c| c.name.clone())
            .collect();
        if !high_cardinality_categoricals.is_empty() {
            score -= RULE_PENALTY;
        }

        let many_zero_columns: Vec<String> = summary
            .columns
            .iter()
            .filter(|c| {
                c.is_numeric
                    && c.non_null_count > 0
                    && ratio(c.zero_count, c.non_null_count) > thresholds.zero_ratio
            })
            .map(|c| c.name.clone())
            .collect();
        if !many_zero_columns.is_empty() {
            score -= RULE_PENALTY;
        }

        let marker = thresholds.id_marker.to_lowercase();
        let suspicious_id_columns: Vec<String> = summary
            .columns
            .iter()
            .filter(|c| {
                c.is_numeric
                    && c.name.to_lowercase().contains(&marker)
                    && c.unique_count < row_count
            })
            .map(|c| c.name.clone())
            .collect();
        if !suspicious_id_columns.is_empty() {
            score -= RULE_PENALTY;
        }

        let report = QualityReport {
            score: f64::clamp(score, 0.0, 1.0),
            max_missing_share,
            too_few_rows,
            too_many_columns,
            too_many_missing,
            high_missing_columns,
            has_constant_columns: !constant_columns.is_empty(),
            constant_columns,
            has_high_cardinality_categoricals: !high_cardinality_categoricals.is_empty(),
            high_cardinality_categoricals,
            has_many_zero_values: !many_zero_columns.is_empty(),
            many_zero_columns,
            has_suspicious_id_duplicates: !suspicious_id_columns.is_empty(),
            suspicious_id_columns,
        };

        debug!(
            "Quality score {:.3} (raw {:.3}), max missing share {:.3}",
            report.score, score, report.max_missing_share
        );

        report
    }
}

impl QualityReport {
    /// The named boolean flags, keyed by flag name.
    pub fn boolean_flags(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            ("too_few_rows", self.too_few_rows),
            ("too_many_columns", self.too_many_columns),
            ("too_many_missing", self.too_many_missing),
            ("has_constant_columns", self.has_constant_columns),
            (
                "has_high_cardinality_categoricals",
                self.has_high_cardinality_categoricals,
            ),
            ("has_many_zero_values", self.has_many_zero_values),
            (
                "has_suspicious_id_duplicates",
                self.has_suspicious_id_duplicates,
            ),
        ])
    }

    /// Per-column findings with their metrics, grouped by rule.
    pub fn problematic_columns(&self, summary: &DatasetSummary) -> Vec<ProblematicColumn> {
        let mut problems = Vec::new();
        for column in self.high_missing_columns.iter().filter_map(|n| summary.column(n)) {
            problems.push(ProblematicColumn {
                name: column.name.clone(),
                issue: ColumnIssue::TooManyMissing {
                    missing_share: column.missing_share,
                },
            });
        }

        for column in self.constant_columns.iter().filter_map(|n| summary.column(n)) {
            problems.push(ProblematicColumn {
                name: column.name.clone(),
                issue: ColumnIssue::ConstantColumn {
                    unique_values: column.unique_count,
                },
            });
        }

        for column in self
            .high_cardinality_categoricals
            .iter()
            .filter_map(|n| summary.column(n))
        {
            problems.push(ProblematicColumn {
                name: column.name.clone(),
                issue: ColumnIssue::HighCardinality {
                    cardinality_ratio: ratio(column.unique_count, summary.row_count),
                    unique_count: column.unique_count,
                },
            });
        }

        for column in self.many_zero_columns.iter().filter_map(|n| summary.column(n)) {
            problems.push(ProblematicColumn {
                name: column.name.clone(),
                issue: ColumnIssue::ManyZeroValues {
                    zero_ratio: ratio(column.zero_count, column.non_null_count),
                    zero_count: column.zero_count,
                },
            });
        }

        for column in self.suspicious_id_columns.iter().filter_map(|n| summary.column(n)) {
            problems.push(ProblematicColumn {
                name: column.name.clone(),
                issue: ColumnIssue::SuspiciousIdDuplicates {
                    unique_count: column.unique_count,
                },
            });
        }

        problems
    }

    /// Whether the score clears [`READINESS_THRESHOLD`].
    pub fn is_ready(&self) -> bool {
        assess_readiness(self.score)
    }
}

/// Score a profiling run with the default thresholds.
pub fn score_quality(summary: &DatasetSummary, missingness: &MissingnessTable) -> QualityReport {
    QualityScorer::score(summary, missingness, &QualityThresholds::default())
}

/// Score a profiling run with custom thresholds.
pub fn score_quality_with(
    summary: &DatasetSummary,
    missingness: &MissingnessTable,
    thresholds: &QualityThresholds,
) -> QualityReport {
    QualityScorer::score(summary, missingness, thresholds)
}

/// `ok_for_model` decision for a score.
pub fn assess_readiness(score: f64) -> bool {
    score >= READINESS_THRESHOLD
}

/// Build the compact JSON digest of a run.
pub fn json_summary(summary: &DatasetSummary, report: &QualityReport) -> JsonSummary {
    JsonSummary {
        n_rows: summary.row_count,
        n_cols: summary.column_count,
        quality_score: report.score,
        problematic_columns: report.problematic_columns(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{analyze_missingness, profile_dataset};
    use crate::table::Table;
    use pretty_assertions::assert_eq;

    fn score_table(table: &Table) -> QualityReport {
        score_quality(&profile_dataset(table), &analyze_missingness(table))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // ==================== Rule tests ====================

    #[test]
    fn test_clean_small_table_only_loses_row_penalty() {
        let table = Table::builder()
            .integer("x", [Some(1), Some(2), Some(3), Some(4)])
            .text("c", [Some("a"), Some("b"), Some("a"), Some("b")])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.too_few_rows);
        assert!(!report.too_many_missing);
        assert_eq!(report.max_missing_share, 0.0);
        assert_close(report.score, 0.8);
    }

    #[test]
    fn test_constant_column_flagged() {
        let table = Table::builder()
            .integer("constant_col", [Some(5), Some(5), Some(5), Some(5)])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.has_constant_columns);
        assert_eq!(report.constant_columns, vec!["constant_col"]);
        assert_close(report.score, 0.7);
    }

    #[test]
    fn test_all_missing_column_is_not_constant() {
        let table = Table::builder()
            .integer("x", [Some(1), Some(2)])
            .empty("void", 2)
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(!report.has_constant_columns);
        assert!(report.too_many_missing);
        assert_eq!(report.high_missing_columns, vec!["void"]);
    }

    #[test]
    fn test_many_zero_values() {
        let table = Table::builder()
            .integer("zeros_col", [Some(0); 5])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.has_many_zero_values);
        assert_eq!(report.many_zero_columns, vec!["zeros_col"]);
    }

    #[test]
    fn test_suspicious_id_duplicates() {
        let table = Table::builder()
            .integer("user_id", [Some(1), Some(2), Some(3), Some(3)])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.has_suspicious_id_duplicates);
        assert_eq!(report.suspicious_id_columns, vec!["user_id"]);
    }

    #[test]
    fn test_id_marker_is_case_insensitive() {
        let table = Table::builder()
            .integer("UserID", [Some(1), Some(1)])
            .build()
            .unwrap();

        assert!(score_table(&table).has_suspicious_id_duplicates);
    }

    #[test]
    fn test_text_id_column_is_not_checked() {
        let table = Table::builder()
            .text("order_id", [Some("a"), Some("a"), Some("b")])
            .build()
            .unwrap();

        assert!(!score_table(&table).has_suspicious_id_duplicates);
    }

    #[test]
    fn test_high_cardinality_categorical() {
        let table = Table::builder()
            .text("email", [Some("a@x"), Some("b@x"), Some("c@x"), Some("a@x")])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.has_high_cardinality_categoricals);
        assert_eq!(report.high_cardinality_categoricals, vec!["email"]);
    }

    fn wide_table(columns: usize) -> Table {
        (0..columns)
            .fold(Table::builder(), |builder, c| {
                builder.integer(format!("c{c}"), (0..100).map(|i| Some(i + c as i64)))
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_too_many_columns() {
        let report = score_table(&wide_table(101));
        assert!(report.too_many_columns);
        assert!(!report.too_few_rows);
        assert_close(report.score, 0.9);

        let report = score_table(&wide_table(100));
        assert!(!report.too_many_columns);
        assert_close(report.score, 1.0);
    }

    #[test]
    fn test_large_distinct_ids_are_not_duplicates() {
        let table = Table::builder()
            .integer(
                "user_id",
                [Some(9_007_199_254_740_992), Some(9_007_199_254_740_993)],
            )
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(!report.has_suspicious_id_duplicates);
        assert!(!report.has_constant_columns);
    }

    #[test]
    fn test_missing_penalty_is_proportional() {
        // 4 of 6 missing; the share itself is subtracted
        let table = Table::builder()
            .integer("x", [Some(1), Some(2), None, None, None, None])
            .integer("y", [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.too_many_missing);
        assert_close(report.max_missing_share, 4.0 / 6.0);
        assert_close(report.score, 1.0 - 0.2 - 4.0 / 6.0);
    }

    #[test]
    fn test_score_is_clamped_for_pathological_tables() {
        let table = Table::builder()
            .integer("id", [Some(0), Some(0), None, None, None])
            .text("t", [Some("a"), Some("b"), Some("c"), None, None])
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!((0.0..=1.0).contains(&report.score));
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::builder()
            .integer("a", Vec::<Option<i64>>::new())
            .build()
            .unwrap();

        let report = score_table(&table);
        assert!(report.too_few_rows);
        assert_eq!(report.max_missing_share, 0.0);
        assert!((0.0..=1.0).contains(&report.score));
    }

    #[test]
    fn test_custom_thresholds() {
        let table = Table::builder()
            .integer("x", [Some(1), Some(2), Some(3)])
            .build()
            .unwrap();
        let thresholds = QualityThresholds::builder().min_rows(2).build().unwrap();

        let report = score_quality_with(
            &profile_dataset(&table),
            &analyze_missingness(&table),
            &thresholds,
        );
        assert!(!report.too_few_rows);
        assert_close(report.score, 1.0);
    }

    // ==================== Output tests ====================

    #[test]
    fn test_boolean_flags() {
        let table = Table::builder()
            .integer("constant_col", [Some(5), Some(5)])
            .build()
            .unwrap();

        let flags = score_table(&table).boolean_flags();
        assert_eq!(flags.len(), 7);
        assert!(flags["too_few_rows"]);
        assert!(flags["has_constant_columns"]);
        assert!(!flags["too_many_columns"]);
    }

    #[test]
    fn test_problematic_columns() {
        let table = Table::builder()
            .integer("user_id", [Some(1), Some(2), Some(3), Some(3)])
            .integer("zeros", [Some(0), Some(0), Some(0), Some(0)])
            .build()
            .unwrap();
        let summary = profile_dataset(&table);
        let report = score_quality(&summary, &analyze_missingness(&table));

        let problems = report.problematic_columns(&summary);
        assert_eq!(
            problems,
            vec![
                ProblematicColumn {
                    name: "zeros".to_string(),
                    issue: ColumnIssue::ConstantColumn { unique_values: 1 },
                },
                ProblematicColumn {
                    name: "zeros".to_string(),
                    issue: ColumnIssue::ManyZeroValues {
                        zero_ratio: 1.0,
                        zero_count: 4,
                    },
                },
                ProblematicColumn {
                    name: "user_id".to_string(),
                    issue: ColumnIssue::SuspiciousIdDuplicates { unique_count: 3 },
                },
            ]
        );
    }

    #[test]
    fn test_problematic_column_json_shape() {
        let problem = ProblematicColumn {
            name: "x".to_string(),
            issue: ColumnIssue::TooManyMissing { missing_share: 0.75 },
        };
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"name": "x", "issue": "too_many_missing", "missing_share": 0.75})
        );
    }

    #[test]
    fn test_json_summary() {
        let table = Table::builder()
            .integer("x", [Some(1), Some(2)])
            .build()
            .unwrap();
        let summary = profile_dataset(&table);
        let report = score_quality(&summary, &analyze_missingness(&table));

        let digest = json_summary(&summary, &report);
        assert_eq!(digest.n_rows, 2);
        assert_eq!(digest.n_cols, 1);
        assert_eq!(digest.quality_score, report.score);
        assert!(digest.problematic_columns.is_empty());
    }

    #[test]
    fn test_readiness() {
        assert!(assess_readiness(0.7));
        assert!(assess_readiness(1.0));
        assert!(!assess_readiness(0.69));
    }
}
