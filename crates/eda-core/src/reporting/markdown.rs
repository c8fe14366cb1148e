use super::generator::FullReport;
use crate::config::ReportConfig;
use crate::utils::unique_file_stems;
use std::fmt::Write;
use std::path::Path;

fn percent(share: f64) -> String {
    format!("{:.2}%", share * 100.0)
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Render `report.md`.
pub fn render_markdown(report: &FullReport, config: &ReportConfig) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail
    let _ = write_markdown(&mut md, report, config);
    md
}

fn write_markdown(md: &mut String, report: &FullReport, config: &ReportConfig) -> std::fmt::Result {
    let summary = &report.summary;
    let quality = &report.quality;
    let source = Path::new(&report.input_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.input_file.clone());

    writeln!(md, "# {}\n", config.title)?;
    writeln!(md, "Source file: `{}`\n", source)?;
    writeln!(
        md,
        "Rows: **{}**, columns: **{}**\n",
        summary.row_count, summary.column_count
    )?;

    writeln!(md, "## Data quality (heuristics)\n")?;
    writeln!(md, "- Quality score: **{:.2}**", quality.score)?;
    writeln!(
        md,
        "- Max missing share per column: **{}**",
        percent(quality.max_missing_share)
    )?;
    writeln!(md, "- Too few rows: **{}**", quality.too_few_rows)?;
    writeln!(md, "- Too many columns: **{}**", quality.too_many_columns)?;
    writeln!(md, "- Too many missing values: **{}**", quality.too_many_missing)?;
    writeln!(md, "- Constant columns: **{}**", quality.has_constant_columns)?;
    writeln!(
        md,
        "- High-cardinality categorical columns: **{}**",
        quality.has_high_cardinality_categoricals
    )?;
    writeln!(
        md,
        "- Numeric columns with many zeros: **{}**",
        quality.has_many_zero_values
    )?;
    writeln!(
        md,
        "- Suspicious ID duplicates: **{}**\n",
        quality.has_suspicious_id_duplicates
    )?;

    if !report.problematic_columns.is_empty() {
        writeln!(md, "### Problematic columns\n")?;
        for problem in &report.problematic_columns {
            writeln!(md, "- `{}`: {}", problem.name, problem.issue.name())?;
        }
        writeln!(md)?;
    }

    writeln!(md, "## Report parameters\n")?;
    writeln!(
        md,
        "- Min missing share for problematic columns: **{}**",
        percent(config.min_missing_share)
    )?;
    writeln!(md, "- Top categories per column: **{}**", config.top_k_categories)?;
    writeln!(md, "- Max histogram columns: **{}**\n", config.max_hist_columns)?;

    writeln!(md, "## Columns\n")?;
    writeln!(md, "See `summary.csv`.\n")?;

    writeln!(md, "## Missing values\n")?;
    if report.missingness.is_empty() || report.missingness.max_share() == 0.0 {
        writeln!(md, "No missing values or the dataset is empty.\n")?;
    } else {
        let flagged: Vec<_> = report
            .missingness
            .iter()
            .filter(|e| e.missing_share > 0.0 && e.missing_share >= config.min_missing_share)
            .collect();
        if flagged.is_empty() {
            writeln!(
                md,
                "No column is missing at least {} of its values.\n",
                percent(config.min_missing_share)
            )?;
        } else {
            for entry in flagged {
                writeln!(
                    md,
                    "- `{}`: {} ({} missing)",
                    entry.column,
                    percent(entry.missing_share),
                    entry.missing_count
                )?;
            }
            writeln!(md)?;
        }
    }
    if !report.missingness.is_empty() {
        writeln!(md, "See `missing.csv`.\n")?;
    }

    writeln!(md, "## Correlation of numeric columns\n")?;
    if report.correlation.is_empty() {
        writeln!(md, "Not enough numeric columns for correlation.\n")?;
    } else {
        writeln!(md, "See `correlation.csv`.\n")?;
    }

    writeln!(md, "## Categorical columns\n")?;
    if report.categories.is_empty() {
        writeln!(md, "No categorical or text columns found.\n")?;
    } else {
        let stems = unique_file_stems(report.categories.iter().map(|e| e.column.as_str()));
        for (entry, stem) in report.categories.iter().zip(&stems) {
            writeln!(md, "- `{}`: `top_categories/{}.csv`", entry.column, stem)?;
        }
        writeln!(md)?;
    }

    writeln!(md, "## Numeric columns\n")?;
    let numeric: Vec<_> = summary
        .columns
        .iter()
        .filter(|c| c.is_numeric)
        .take(config.max_hist_columns)
        .collect();
    if numeric.is_empty() {
        writeln!(md, "No numeric columns found.")?;
    } else {
        writeln!(md, "| column | min | max | mean | std |")?;
        writeln!(md, "|---|---|---|---|---|")?;
        for column in numeric {
            writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                column.name,
                number(column.min),
                number(column.max),
                number(column.mean),
                number(column.std_dev)
            )?;
        }
    }

    Ok(())
}
