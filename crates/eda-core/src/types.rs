use serde::{Deserialize, Serialize};

// ============================================================================
// Column / Dataset Summaries
// ============================================================================

/// Per-column summary produced by the profiler.
///
/// `min`, `max`, `mean` and `std_dev` are only present for numeric columns
/// with at least one value; `std_dev` additionally needs two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Type name as reported by the loader.
    pub declared_type: String,
    pub non_null_count: usize,
    pub missing_count: usize,
    /// `missing_count / row_count`, 0.0 for an empty table.
    pub missing_share: f64,
    /// Distinct non-missing values.
    pub unique_count: usize,
    /// Up to three distinct values, in first-occurrence order.
    pub example_values: Vec<String>,
    pub is_numeric: bool,
    /// Values exactly equal to zero. Always 0 for non-numeric columns.
    pub zero_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub column_count: usize,
    /// One entry per column, in table order.
    pub columns: Vec<ColumnSummary>,
}

impl DatasetSummary {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric_column_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_numeric).count()
    }

    /// Columns profiled as non-numeric (text, categorical or empty).
    pub fn categorical_column_count(&self) -> usize {
        self.column_count - self.numeric_column_count()
    }

    /// Flatten into printable rows (the `overview` table and `summary.csv`).
    pub fn flatten(&self) -> Vec<SummaryRow> {
        self.columns
            .iter()
            .map(|c| SummaryRow {
                name: c.name.clone(),
                dtype: c.declared_type.clone(),
                non_null: c.non_null_count,
                missing: c.missing_count,
                missing_share: c.missing_share,
                unique: c.unique_count,
                is_numeric: c.is_numeric,
                zeros: c.zero_count,
                min: c.min,
                max: c.max,
                mean: c.mean,
                std: c.std_dev,
            })
            .collect()
    }
}

/// One row of the flattened summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub missing: usize,
    pub missing_share: f64,
    pub unique: usize,
    pub is_numeric: bool,
    pub zeros: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

// ============================================================================
// Missingness
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingnessEntry {
    pub column: String,
    pub missing_count: usize,
    pub missing_share: f64,
}

/// Missing counts per column, sorted by descending share.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingnessTable {
    pub entries: Vec<MissingnessEntry>,
}

impl MissingnessTable {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MissingnessEntry> {
        self.entries.iter()
    }

    pub fn get(&self, column: &str) -> Option<&MissingnessEntry> {
        self.entries.iter().find(|e| e.column == column)
    }

    /// Highest missing share over all columns, 0.0 when empty.
    pub fn max_share(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.missing_share)
            .fold(0.0, f64::max)
    }
}

// ============================================================================
// Correlation
// ============================================================================

/// Symmetric Pearson correlation matrix over the numeric columns.
///
/// `values[i][j]` is `None` when the coefficient is not computable (fewer
/// than two rows where both columns are present, or a constant column).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Coefficient for a pair of columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.values[i][j]
    }
}

// ============================================================================
// Category Frequencies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    /// Share of this value among the returned values only.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCategories {
    pub column: String,
    pub values: Vec<CategoryCount>,
}

/// Top-k value frequencies for text and categorical columns, in table order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryFrequencyTable {
    pub columns: Vec<ColumnCategories>,
}

impl CategoryFrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnCategories> {
        self.columns.iter()
    }

    pub fn get(&self, column: &str) -> Option<&[CategoryCount]> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.values.as_slice())
    }
}

// ============================================================================
// Quality
// ============================================================================

/// Heuristic quality assessment of one profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Composite score in `[0, 1]`.
    pub score: f64,
    /// Highest missing share of any column.
    pub max_missing_share: f64,
    pub too_few_rows: bool,
    pub too_many_columns: bool,
    pub too_many_missing: bool,
    /// Columns whose missing share exceeds the threshold.
    pub high_missing_columns: Vec<String>,
    pub has_constant_columns: bool,
    pub constant_columns: Vec<String>,
    pub has_high_cardinality_categoricals: bool,
    pub high_cardinality_categoricals: Vec<String>,
    pub has_many_zero_values: bool,
    pub many_zero_columns: Vec<String>,
    pub has_suspicious_id_duplicates: bool,
    pub suspicious_id_columns: Vec<String>,
}

/// Compact machine-readable digest of a run (`summary.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSummary {
    pub n_rows: usize,
    pub n_cols: usize,
    pub quality_score: f64,
    pub problematic_columns: Vec<ProblematicColumn>,
}

/// Column-level finding reported in the JSON summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblematicColumn {
    pub name: String,
    #[serde(flatten)]
    pub issue: ColumnIssue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ColumnIssue {
    TooManyMissing {
        missing_share: f64,
    },
    ConstantColumn {
        unique_values: usize,
    },
    HighCardinality {
        cardinality_ratio: f64,
        unique_count: usize,
    },
    ManyZeroValues {
        zero_ratio: f64,
        zero_count: usize,
    },
    SuspiciousIdDuplicates {
        unique_count: usize,
    },
}

impl ColumnIssue {
    /// The `issue` tag as serialized.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TooManyMissing { .. } => "too_many_missing",
            Self::ConstantColumn { .. } => "constant_column",
            Self::HighCardinality { .. } => "high_cardinality",
            Self::ManyZeroValues { .. } => "many_zero_values",
            Self::SuspiciousIdDuplicates { .. } => "suspicious_id_duplicates",
        }
    }
}
