//! Pearson correlation among numeric columns.

use super::statistics::pearson_pairwise;
use crate::table::Table;
use crate::types::CorrelationMatrix;
use std::borrow::Cow;
use tracing::debug;

/// Builds the pairwise-complete correlation matrix.
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Correlate every pair of numeric columns, in table order.
    ///
    /// Each pair only uses the rows where both columns have a value. The
    /// diagonal is always 1.0; an off-diagonal cell is `None` when it cannot
    /// be computed. No numeric columns gives an empty matrix.
    pub fn analyze(table: &Table) -> CorrelationMatrix {
        let numeric: Vec<(&str, Cow<'_, [Option<f64>]>)> = table
            .columns()
            .iter()
            .filter_map(|c| Some((c.name(), c.numeric_values()?)))
            .collect();

        if numeric.is_empty() {
            return CorrelationMatrix::default();
        }

        let n = numeric.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            values[i][i] = Some(1.0);
            for j in (i + 1)..n {
                let r = pearson_pairwise(&numeric[i].1, &numeric[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        debug!("Correlation matrix computed over {} numeric columns", n);

        CorrelationMatrix {
            columns: numeric.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }
}

/// Pearson correlation matrix of the numeric columns.
pub fn compute_correlation(table: &Table) -> CorrelationMatrix {
    CorrelationAnalyzer::analyze(table)
}
