//! Dataset Profiling Library
//!
//! Descriptive statistics and data-quality heuristics for tabular (CSV)
//! datasets, built with Rust and Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Column Profiling**: Missingness, cardinality, example values and numeric moments
//! - **Missingness Tables**: Per-column missing counts sorted by share
//! - **Correlation**: Pairwise-complete Pearson correlation over numeric columns
//! - **Category Frequencies**: Top-k values of text and categorical columns
//! - **Quality Scoring**: A fixed heuristic score with named flags and offending columns
//! - **Reporting**: CSV, Markdown and JSON report files
//!
//! The profiling functions are pure: they read an immutable [`Table`] and
//! never fail. Loading and report writing return [`Result`].
//!
//! # Quick Start
//!
//! ```rust
//! use eda_core::{Table, analyze_missingness, profile_dataset, score_quality, top_categories};
//!
//! let table = Table::builder()
//!     .integer("age", [Some(10), Some(20), Some(30), None])
//!     .integer("height", [Some(140), Some(150), Some(160), Some(170)])
//!     .text("city", [Some("A"), Some("B"), Some("A"), None])
//!     .build()?;
//!
//! let summary = profile_dataset(&table);
//! let missingness = analyze_missingness(&table);
//! let quality = score_quality(&summary, &missingness);
//!
//! assert_eq!(summary.row_count, 4);
//! assert_eq!(missingness.entries[0].column, "age");
//! assert!(quality.too_few_rows);
//!
//! let categories = top_categories(&table, 5, 2);
//! assert_eq!(categories.get("city").unwrap()[0].count, 2);
//! # Ok::<(), eda_core::EdaError>(())
//! ```
//!
//! # Loading CSV
//!
//! ```rust,no_run
//! use eda_core::loader::{Encoding, LoadOptions, load_csv};
//!
//! let options = LoadOptions {
//!     separator: b';',
//!     encoding: Encoding::LossyUtf8,
//!     ..LoadOptions::default()
//! };
//! let table = load_csv("data.csv", &options)?;
//! # Ok::<(), eda_core::EdaError>(())
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, QualityThresholds, QualityThresholdsBuilder, ReportConfig,
    ReportConfigBuilder,
};
pub use error::{EdaError, Result, ResultExt};
pub use loader::{Encoding, LoadOptions, ensure_not_empty, load_csv, load_csv_bytes};
pub use profiler::{
    CategoryFrequencyAnalyzer, CorrelationAnalyzer, DataProfiler, MissingnessAnalyzer,
    analyze_missingness, compute_correlation, profile_column, profile_dataset, top_categories,
};
pub use quality::{
    QualityScorer, READINESS_THRESHOLD, assess_readiness, json_summary, score_quality,
    score_quality_with,
};
pub use reporting::{FullReport, ReportGenerator, WrittenReport};
pub use table::{Column, ColumnData, ColumnKind, NumericRepr, Table, TableBuilder};
pub use types::{
    CategoryCount, CategoryFrequencyTable, ColumnCategories, ColumnIssue, ColumnSummary,
    CorrelationMatrix, DatasetSummary, JsonSummary, MissingnessEntry, MissingnessTable,
    ProblematicColumn, QualityReport, SummaryRow,
};
