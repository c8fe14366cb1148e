//! Per-column missing value counts.

use crate::table::Table;
use crate::types::{MissingnessEntry, MissingnessTable};
use crate::utils::ratio;

/// Computes missing counts and shares straight from the table.
pub struct MissingnessAnalyzer;

impl MissingnessAnalyzer {
    /// Missing count and share per column, sorted by descending share.
    ///
    /// Ties keep table column order. A table without rows yields an empty
    /// result.
    pub fn analyze(table: &Table) -> MissingnessTable {
        let row_count = table.row_count();
        if row_count == 0 {
            return MissingnessTable::default();
        }

        let mut entries: Vec<MissingnessEntry> = table
            .columns()
            .iter()
            .map(|column| {
                let missing_count = column.missing_count();
                MissingnessEntry {
                    column: column.name().to_string(),
                    missing_count,
                    missing_share: ratio(missing_count, row_count),
                }
            })
            .collect();

        // sort_by is stable
        entries.sort_by(|a, b| b.missing_share.total_cmp(&a.missing_share));

        MissingnessTable { entries }
    }
}

/// Analyze missing values of every column.
pub fn analyze_missingness(table: &Table) -> MissingnessTable {
    MissingnessAnalyzer::analyze(table)
}
