//! Configuration types for report generation and quality scoring.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic setup.

use crate::error::EdaError;
use crate::loader::LoadOptions;
use crate::profiler::{DEFAULT_MAX_CATEGORY_COLUMNS, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid share for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidShare { field: String, value: f64 },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<ConfigValidationError> for EdaError {
    fn from(err: ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

fn check_share(field: &str, value: f64) -> Result<(), ConfigValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidShare {
            field: field.to_string(),
            value,
        })
    }
}

// ============================================================================
// Quality Thresholds
// ============================================================================

/// Thresholds used by the quality scorer.
///
/// # Example
///
/// ```rust
/// use eda_core::config::QualityThresholds;
///
/// let thresholds = QualityThresholds::builder()
///     .min_rows(50)
///     .zero_ratio(0.9)
///     .build()
///     .unwrap();
///
/// assert_eq!(thresholds.max_columns, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Fewer rows than this flags `too_few_rows`.
    /// Default: 100
    pub min_rows: usize,

    /// More columns than this flags `too_many_columns`.
    /// Default: 100
    pub max_columns: usize,

    /// A column missing more than this share flags `too_many_missing`.
    /// Default: 0.5
    pub max_missing_share: f64,

    /// Distinct-to-row ratio above which a non-numeric column is high
    /// cardinality.
    /// Default: 0.5
    pub high_cardinality_ratio: f64,

    /// Share of zeros above which a numeric column is flagged.
    /// Default: 0.8
    pub zero_ratio: f64,

    /// Case-insensitive substring marking identifier columns.
    /// Default: "id"
    pub id_marker: String,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_rows: 100,
            max_columns: 100,
            max_missing_share: 0.5,
            high_cardinality_ratio: 0.5,
            zero_ratio: 0.8,
            id_marker: "id".to_string(),
        }
    }
}

impl QualityThresholds {
    /// Create a new thresholds builder.
    pub fn builder() -> QualityThresholdsBuilder {
        QualityThresholdsBuilder::default()
    }

    /// Validate the thresholds and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_share("max_missing_share", self.max_missing_share)?;
        check_share("high_cardinality_ratio", self.high_cardinality_ratio)?;
        check_share("zero_ratio", self.zero_ratio)?;

        if self.id_marker.is_empty() {
            return Err(ConfigValidationError::InvalidValue {
                field: "id_marker".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`QualityThresholds`] with fluent API.
#[derive(Debug, Default)]
pub struct QualityThresholdsBuilder {
    min_rows: Option<usize>,
    max_columns: Option<usize>,
    max_missing_share: Option<f64>,
    high_cardinality_ratio: Option<f64>,
    zero_ratio: Option<f64>,
    id_marker: Option<String>,
}

impl QualityThresholdsBuilder {
    pub fn min_rows(mut self, rows: usize) -> Self {
        self.min_rows = Some(rows);
        self
    }

    pub fn max_columns(mut self, columns: usize) -> Self {
        self.max_columns = Some(columns);
        self
    }

    /// # Arguments
    /// * `share` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn max_missing_share(mut self, share: f64) -> Self {
        self.max_missing_share = Some(share);
        self
    }

    pub fn high_cardinality_ratio(mut self, ratio: f64) -> Self {
        self.high_cardinality_ratio = Some(ratio);
        self
    }

    pub fn zero_ratio(mut self, ratio: f64) -> Self {
        self.zero_ratio = Some(ratio);
        self
    }

    pub fn id_marker(mut self, marker: impl Into<String>) -> Self {
        self.id_marker = Some(marker.into());
        self
    }

    /// Build the thresholds.
    ///
    /// Returns validated `QualityThresholds` or an error if validation fails.
    pub fn build(self) -> Result<QualityThresholds, ConfigValidationError> {
        let defaults = QualityThresholds::default();
        let thresholds = QualityThresholds {
            min_rows: self.min_rows.unwrap_or(defaults.min_rows),
            max_columns: self.max_columns.unwrap_or(defaults.max_columns),
            max_missing_share: self.max_missing_share.unwrap_or(defaults.max_missing_share),
            high_cardinality_ratio: self
                .high_cardinality_ratio
                .unwrap_or(defaults.high_cardinality_ratio),
            zero_ratio: self.zero_ratio.unwrap_or(defaults.zero_ratio),
            id_marker: self.id_marker.unwrap_or(defaults.id_marker),
        };

        thresholds.validate()?;
        Ok(thresholds)
    }
}

// ============================================================================
// Report Configuration
// ============================================================================

/// Configuration for the `report` command.
///
/// Use [`ReportConfig::builder()`] to create a new configuration
/// with fluent API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving the report files.
    /// Default: "reports"
    pub out_dir: PathBuf,

    /// CSV loader options (separator, encoding).
    pub load: LoadOptions,

    /// Numeric columns listed in the histogram section of the report.
    /// Default: 6
    pub max_hist_columns: usize,

    /// Values per column in the category tables.
    /// Default: 5
    pub top_k_categories: usize,

    /// Number of categorical columns given a frequency table.
    /// Default: 5
    pub max_category_columns: usize,

    /// Report heading.
    /// Default: "EDA report"
    pub title: String,

    /// Columns missing at least this share are listed as problematic in the
    /// Markdown report.
    /// Default: 0.1
    pub min_missing_share: f64,

    /// Whether to write `summary.json`.
    /// Default: false
    pub json_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
            load: LoadOptions::default(),
            max_hist_columns: 6,
            top_k_categories: DEFAULT_TOP_K,
            max_category_columns: DEFAULT_MAX_CATEGORY_COLUMNS,
            title: "EDA report".to_string(),
            min_missing_share: 0.1,
            json_summary: false,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```rust
    /// use eda_core::config::ReportConfig;
    ///
    /// let config = ReportConfig::builder()
    ///     .out_dir("out")
    ///     .top_k_categories(3)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.title, "EDA report");
    /// ```
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_share("min_missing_share", self.min_missing_share)?;

        if self.title.trim().is_empty() {
            return Err(ConfigValidationError::InvalidValue {
                field: "title".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    out_dir: Option<PathBuf>,
    load: Option<LoadOptions>,
    max_hist_columns: Option<usize>,
    top_k_categories: Option<usize>,
    max_category_columns: Option<usize>,
    title: Option<String>,
    min_missing_share: Option<f64>,
    json_summary: Option<bool>,
}

impl ReportConfigBuilder {
    /// Set the output directory for report files.
    pub fn out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(path.into());
        self
    }

    /// Set the CSV loader options.
    pub fn load_options(mut self, options: LoadOptions) -> Self {
        self.load = Some(options);
        self
    }

    pub fn max_hist_columns(mut self, columns: usize) -> Self {
        self.max_hist_columns = Some(columns);
        self
    }

    pub fn top_k_categories(mut self, k: usize) -> Self {
        self.top_k_categories = Some(k);
        self
    }

    pub fn max_category_columns(mut self, columns: usize) -> Self {
        self.max_category_columns = Some(columns);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the missing share at which a column is listed as problematic.
    ///
    /// # Arguments
    /// * `share` - Value between 0.0 and 1.0 (e.g., 0.1 = 10%)
    pub fn min_missing_share(mut self, share: f64) -> Self {
        self.min_missing_share = Some(share);
        self
    }

    /// Enable or disable writing `summary.json`.
    pub fn json_summary(mut self, enable: bool) -> Self {
        self.json_summary = Some(enable);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ReportConfig` or an error if validation fails.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let defaults = ReportConfig::default();
        let config = ReportConfig {
            out_dir: self.out_dir.unwrap_or(defaults.out_dir),
            load: self.load.unwrap_or(defaults.load),
            max_hist_columns: self.max_hist_columns.unwrap_or(defaults.max_hist_columns),
            top_k_categories: self.top_k_categories.unwrap_or(defaults.top_k_categories),
            max_category_columns: self
                .max_category_columns
                .unwrap_or(defaults.max_category_columns),
            title: self.title.unwrap_or(defaults.title),
            min_missing_share: self.min_missing_share.unwrap_or(defaults.min_missing_share),
            json_summary: self.json_summary.unwrap_or(defaults.json_summary),
        };

        config.validate()?;
        Ok(config)
    }
}
