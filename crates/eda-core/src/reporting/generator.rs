use super::markdown::render_markdown;
use crate::config::ReportConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::profiler::{analyze_missingness, compute_correlation, profile_dataset, top_categories};
use crate::quality::{json_summary, score_quality};
use crate::table::Table;
use crate::types::{
    CategoryFrequencyTable, CorrelationMatrix, DatasetSummary, JsonSummary, MissingnessTable,
    ProblematicColumn, QualityReport, SummaryRow,
};
use crate::utils::unique_file_stems;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ============================================================================
// Full Report
// ============================================================================

/// Every profiling result for one dataset.
///
/// Use this for both JSON output (`--json`) and file writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    pub summary: DatasetSummary,
    pub missingness: MissingnessTable,
    pub correlation: CorrelationMatrix,
    pub categories: CategoryFrequencyTable,
    pub quality: QualityReport,
    pub problematic_columns: Vec<ProblematicColumn>,
}

impl FullReport {
    /// Run the profiling engine over a table.
    pub fn build(input_file: impl Into<String>, table: &Table, config: &ReportConfig) -> Self {
        let summary = profile_dataset(table);
        let missingness = analyze_missingness(table);
        let correlation = compute_correlation(table);
        let categories = top_categories(
            table,
            config.max_category_columns,
            config.top_k_categories,
        );
        let quality = score_quality(&summary, &missingness);
        let problematic_columns = quality.problematic_columns(&summary);

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.into(),
            summary,
            missingness,
            correlation,
            categories,
            quality,
            problematic_columns,
        }
    }

    /// The compact digest written to `summary.json`.
    pub fn json_summary(&self) -> JsonSummary {
        json_summary(&self.summary, &self.quality)
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Paths of the files written for one report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WrittenReport {
    pub summary_csv: PathBuf,
    pub missing_csv: Option<PathBuf>,
    pub correlation_csv: Option<PathBuf>,
    pub category_csvs: Vec<PathBuf>,
    pub markdown: PathBuf,
    pub json_summary: Option<PathBuf>,
}

/// Writes report artifacts into an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every artifact of a report.
    ///
    /// `missing.csv` and `correlation.csv` are skipped when their tables are
    /// empty; `summary.json` is only written when enabled in the config.
    pub fn write_all(&self, report: &FullReport, config: &ReportConfig) -> Result<WrittenReport> {
        self.prepare_output_dir()?;

        let mut written = WrittenReport {
            summary_csv: self.write_summary_csv(&report.summary)?,
            ..WrittenReport::default()
        };

        if !report.missingness.is_empty() {
            written.missing_csv = Some(self.write_missing_csv(&report.missingness)?);
        }
        if !report.correlation.is_empty() {
            written.correlation_csv = Some(self.write_correlation_csv(&report.correlation)?);
        }
        written.category_csvs = self.write_category_csvs(&report.categories)?;
        written.markdown = self.write_markdown(report, config)?;
        if config.json_summary {
            written.json_summary = Some(self.write_json_summary(&report.json_summary())?);
        }

        info!("Report written to: {}", self.output_dir.display());
        Ok(written)
    }

    /// Flattened per-column summary.
    pub fn write_summary_csv(&self, summary: &DatasetSummary) -> Result<PathBuf> {
        let rows = summary.flatten();
        let counts = |f: fn(&SummaryRow) -> usize| -> Vec<u64> {
            rows.iter().map(|r| f(r) as u64).collect()
        };

        let mut df = df![
            "name" => rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "dtype" => rows.iter().map(|r| r.dtype.as_str()).collect::<Vec<_>>(),
            "non_null" => counts(|r| r.non_null),
            "missing" => counts(|r| r.missing),
            "missing_share" => rows.iter().map(|r| r.missing_share).collect::<Vec<_>>(),
            "unique" => counts(|r| r.unique),
            "is_numeric" => rows.iter().map(|r| r.is_numeric).collect::<Vec<_>>(),
            "zeros" => counts(|r| r.zeros),
            "min" => rows.iter().map(|r| r.min).collect::<Vec<_>>(),
            "max" => rows.iter().map(|r| r.max).collect::<Vec<_>>(),
            "mean" => rows.iter().map(|r| r.mean).collect::<Vec<_>>(),
            "std" => rows.iter().map(|r| r.std).collect::<Vec<_>>(),
        ]
        .context("Building summary table")?;

        self.write_csv("summary.csv", &mut df)
    }

    /// Missing counts and shares, highest share first.
    pub fn write_missing_csv(&self, missingness: &MissingnessTable) -> Result<PathBuf> {
        let mut df = df![
            "column" => missingness.iter().map(|e| e.column.as_str()).collect::<Vec<_>>(),
            "missing_count" => missingness.iter().map(|e| e.missing_count as u64).collect::<Vec<_>>(),
            "missing_share" => missingness.iter().map(|e| e.missing_share).collect::<Vec<_>>(),
        ]
        .context("Building missingness table")?;

        self.write_csv("missing.csv", &mut df)
    }

    /// Square matrix with the column names as first column; blank cells are
    /// coefficients that could not be computed.
    ///
    /// The label column has an empty header, padded with `_` only if a
    /// numeric column already uses that name.
    pub fn write_correlation_csv(&self, correlation: &CorrelationMatrix) -> Result<PathBuf> {
        let mut label = String::new();
        while correlation.columns.contains(&label) {
            label.push('_');
        }

        let mut columns = Vec::with_capacity(correlation.len() + 1);
        columns.push(Column::new(label.into(), correlation.columns.clone()));
        for (j, name) in correlation.columns.iter().enumerate() {
            let values: Vec<Option<f64>> = correlation.values.iter().map(|row| row[j]).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        let mut df = DataFrame::new(columns).context("Building correlation table")?;
        self.write_csv("correlation.csv", &mut df)
    }

    /// One `value,count,share` file per column under `top_categories/`.
    pub fn write_category_csvs(&self, categories: &CategoryFrequencyTable) -> Result<Vec<PathBuf>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let dir = self.output_dir.join("top_categories");
        fs::create_dir_all(&dir).context(format!("Creating {}", dir.display()))?;

        let stems = unique_file_stems(categories.iter().map(|e| e.column.as_str()));
        let mut paths = Vec::with_capacity(categories.len());
        for (entry, stem) in categories.iter().zip(&stems) {
            let mut df = df![
                "value" => entry.values.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
                "count" => entry.values.iter().map(|c| c.count as u64).collect::<Vec<_>>(),
                "share" => entry.values.iter().map(|c| c.share).collect::<Vec<_>>(),
            ]
            .context(format!("Building category table for '{}'", entry.column))?;

            let file_name = format!("{stem}.csv");
            paths.push(self.write_csv(Path::new("top_categories").join(file_name), &mut df)?);
        }

        Ok(paths)
    }

    /// Human-readable `report.md`.
    pub fn write_markdown(&self, report: &FullReport, config: &ReportConfig) -> Result<PathBuf> {
        let markdown = render_markdown(report, config);
        self.write_text("report.md", &markdown)
    }

    /// Compact `summary.json`.
    pub fn write_json_summary(&self, summary: &JsonSummary) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(summary)?;
        self.write_text("summary.json", &json)
    }

    fn prepare_output_dir(&self) -> Result<()> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(EdaError::ReportWriteFailed(format!(
                "'{}' exists and is not a directory",
                self.output_dir.display()
            )));
        }
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))
    }

    fn write_csv(&self, relative: impl AsRef<Path>, df: &mut DataFrame) -> Result<PathBuf> {
        let path = self.output_dir.join(relative);
        let mut file = File::create(&path).context(format!("Creating {}", path.display()))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Writing {}", path.display()))?;

        debug!("Saved: {}", path.display());
        Ok(path)
    }

    fn write_text(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(relative);
        let mut file = File::create(&path).context(format!("Creating {}", path.display()))?;
        file.write_all(content.as_bytes())
            .context(format!("Writing {}", path.display()))?;

        debug!("Saved: {}", path.display());
        Ok(path)
    }
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

    fn sample_report(config: &ReportConfig) -> FullReport {
        FullReport::build("data/sample.csv", &sample_table(), config)
    }

    // ==================== FullReport tests ====================

    #[test]
    fn test_full_report_contents() {
        let config = ReportConfig::default();
        let report = sample_report(&config);

        assert_eq!(report.input_file, "data/sample.csv");
        assert_eq!(report.summary.row_count, 4);
        assert_eq!(report.missingness.len(), 3);
        assert_eq!(report.correlation.columns, vec!["age", "height"]);
        assert_eq!(report.categories.len(), 1);
        assert!(report.quality.too_few_rows);
    }

    #[test]
    fn test_full_report_serializes() {
        let report = sample_report(&ReportConfig::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["row_count"], 4);
        assert_eq!(json["missingness"][0]["column"], "age");
        assert_eq!(json["categories"][0]["column"], "city");
        assert!(json["quality"]["score"].is_number());
    }

    // ==================== ReportGenerator tests ====================

    #[test]
    fn test_write_all_creates_expected_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::builder()
            .out_dir(dir.path().join("out"))
            .json_summary(true)
            .build()
            .unwrap();
        let report = sample_report(&config);

        let written = ReportGenerator::new(&config.out_dir)
            .write_all(&report, &config)
            .unwrap();

        assert!(written.summary_csv.exists());
        assert!(written.missing_csv.as_ref().unwrap().exists());
        assert!(written.correlation_csv.as_ref().unwrap().exists());
        assert_eq!(written.category_csvs.len(), 1);
        assert!(written.category_csvs[0].ends_with("top_categories/city.csv"));
        assert!(written.markdown.exists());
        assert!(written.json_summary.as_ref().unwrap().exists());
    }

    #[test]
    fn test_summary_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report(&ReportConfig::default());

        let path = ReportGenerator::new(dir.path())
            .write_summary_csv(&report.summary)
            .unwrap();
        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();

        assert_eq!(
            lines.next().unwrap(),
            "name,dtype,non_null,missing,missing_share,unique,is_numeric,zeros,min,max,mean,std"
        );
        assert!(lines.next().unwrap().starts_with("age,i64,3,1,0.25,3,true,0,"));
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn test_category_csv_content() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::builder().top_k_categories(1).build().unwrap();
        let report = sample_report(&config);

        let paths = ReportGenerator::new(dir.path())
            .write_category_csvs(&report.categories)
            .unwrap();
        let content = fs::read_to_string(&paths[0]).unwrap();

        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "value,count,share");
        assert!(lines.next().unwrap().starts_with("A,2,1"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_correlation_csv_with_column_named_column() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::builder()
            .out_dir(dir.path())
            .build()
            .unwrap();
        let table = Table::builder()
            .integer("column", [Some(1), Some(2), Some(3)])
            .integer("x", [Some(2), Some(4), Some(6)])
            .build()
            .unwrap();
        let report = FullReport::build("t.csv", &table, &config);

        let written = ReportGenerator::new(dir.path())
            .write_all(&report, &config)
            .unwrap();
        let content = fs::read_to_string(written.correlation_csv.unwrap()).unwrap();

        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), ",column,x");
        assert!(lines.next().unwrap().starts_with("column,1"));
    }

    #[test]
    fn test_category_files_do_not_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::builder()
            .text("a b", [Some("x"), Some("y")])
            .text("a_b", [Some("z"), Some("z")])
            .build()
            .unwrap();
        let report = FullReport::build("t.csv", &table, &ReportConfig::default());

        let paths = ReportGenerator::new(dir.path())
            .write_category_csvs(&report.categories)
            .unwrap();

        assert!(paths[0].ends_with("top_categories/a_b.csv"));
        assert!(paths[1].ends_with("top_categories/a_b_2.csv"));
        assert!(fs::read_to_string(&paths[0]).unwrap().contains("x,1"));
        assert!(fs::read_to_string(&paths[1]).unwrap().contains("z,2"));
    }

    #[test]
    fn test_empty_tables_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::builder()
            .out_dir(dir.path())
            .build()
            .unwrap();
        let table = Table::builder()
            .text("t", [Some("a"), Some("b")])
            .build()
            .unwrap();
        let report = FullReport::build("t.csv", &table, &config);

        let written = ReportGenerator::new(dir.path())
            .write_all(&report, &config)
            .unwrap();

        assert!(written.correlation_csv.is_none());
        assert!(written.json_summary.is_none());
        assert!(!dir.path().join("correlation.csv").exists());
    }

    #[test]
    fn test_output_dir_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "x").unwrap();
        let config = ReportConfig::default();
        let report = sample_report(&config);

        let result = ReportGenerator::new(&blocker).write_all(&report, &config);
        assert!(matches!(result, Err(EdaError::ReportWriteFailed(_))));
    }

    #[test]
    fn test_json_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report(&ReportConfig::default());

        let path = ReportGenerator::new(dir.path())
            .write_json_summary(&report.json_summary())
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(json["n_rows"], 4);
        assert_eq!(json["n_cols"], 3);
        assert!(json["problematic_columns"].is_array());
    }
}
