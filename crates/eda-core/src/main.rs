//! CLI entry point for dataset profiling reports.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use eda_core::{
    DatasetSummary, EdaError, Encoding, FullReport, LoadOptions, ReportConfig, ReportGenerator,
    SummaryRow, WrittenReport, ensure_not_empty, load_csv, profile_dataset,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// CLI-compatible encoding enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEncoding {
    /// Strict UTF-8
    Utf8,
    /// UTF-8 with invalid bytes replaced
    Lossy,
}

impl From<CliEncoding> for Encoding {
    fn from(cli: CliEncoding) -> Self {
        match cli {
            CliEncoding::Utf8 => Encoding::Utf8,
            CliEncoding::Lossy => Encoding::LossyUtf8,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory data analysis for CSV files",
    long_about = "Profiles CSV datasets: per-column summaries, missing values, \
                  correlations, top categories and a heuristic quality score.\n\n\
                  EXAMPLES:\n  \
                  # Quick look at a dataset\n  \
                  eda-cli overview data.csv\n\n  \
                  # Full report with a JSON summary\n  \
                  eda-cli report data.csv --out-dir reports --json-summary\n\n  \
                  # Semicolon-separated input, machine-readable output\n  \
                  eda-cli report data.csv --sep ';' --json | jq .quality.score"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the shape and a per-column summary table
    Overview {
        /// Path to the CSV file
        path: PathBuf,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Write a full report (CSV tables, Markdown, optional JSON summary)
    Report(ReportArgs),
}

/// Loader options shared by every command.
#[derive(Args, Debug)]
struct InputArgs {
    /// Field separator
    #[arg(long, default_value = ",")]
    sep: char,

    /// Input encoding
    #[arg(long, value_enum, default_value = "utf8")]
    encoding: CliEncoding,
}

impl InputArgs {
    fn load_options(&self) -> Result<LoadOptions, EdaError> {
        if !self.sep.is_ascii() {
            return Err(EdaError::InvalidConfig(format!(
                "separator must be a single ASCII character, got '{}'",
                self.sep
            )));
        }
        Ok(LoadOptions {
            separator: self.sep as u8,
            encoding: self.encoding.into(),
            ..LoadOptions::default()
        })
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Path to the CSV file
    path: PathBuf,

    #[command(flatten)]
    input: InputArgs,

    /// Output directory for the report
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,

    /// Maximum numeric columns listed in the numeric section
    #[arg(long, default_value = "6")]
    max_hist_columns: usize,

    /// Number of top values per categorical column
    #[arg(long, default_value = "5")]
    top_k_categories: usize,

    /// Report title
    #[arg(long, default_value = "EDA report")]
    title: String,

    /// Minimum missing share (0.0 - 1.0) for a column to be listed in the report
    #[arg(long, default_value = "0.1")]
    min_missing_share: f64,

    /// Also write summary.json
    #[arg(long)]
    json_summary: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the full JSON report.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn json_output(&self) -> bool {
        matches!(&self.command, Command::Report(args) if args.json)
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Exit code 2 for bad input or arguments, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<EdaError>() {
        Some(e) if e.is_user_error() => 2,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet, cli.json_output());

    let result = match cli.command {
        Command::Overview { path, input } => run_overview(path, &input),
        Command::Report(args) => run_report(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run_overview(path: PathBuf, input: &InputArgs) -> Result<()> {
    let table = load_csv(&path, &input.load_options()?)?;
    ensure_not_empty(&table)?;
    let summary = profile_dataset(&table);

    println!("Rows: {}", summary.row_count);
    println!("Columns: {}", summary.column_count);
    println!();
    println!("Columns:");
    print!("{}", format_summary_table(&summary));

    Ok(())
}

fn run_report(args: ReportArgs) -> Result<()> {
    let config = ReportConfig::builder()
        .out_dir(&args.out_dir)
        .load_options(args.input.load_options()?)
        .max_hist_columns(args.max_hist_columns)
        .top_k_categories(args.top_k_categories)
        .title(&args.title)
        .min_missing_share(args.min_missing_share)
        .json_summary(args.json_summary)
        .build()
        .map_err(EdaError::from)?;

    let table = load_csv(&args.path, &config.load)?;
    ensure_not_empty(&table)?;
    info!("Dataset loaded: {:?}", table.shape());

    let report = FullReport::build(args.path.to_string_lossy(), &table, &config);
    let written = ReportGenerator::new(&config.out_dir)
        .write_all(&report, &config)
        .with_context(|| format!("Writing report to {}", config.out_dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_readable_summary(&report, &written, &config);
    }

    Ok(())
}

/// Print where the report went and the headline quality numbers.
fn print_human_readable_summary(report: &FullReport, written: &WrittenReport, config: &ReportConfig) {
    let quality = &report.quality;

    println!("Report generated in: {}", config.out_dir.display());
    println!("- Markdown: {}", written.markdown.display());
    println!("- Summary table: {}", written.summary_csv.display());
    if let Some(path) = &written.missing_csv {
        println!("- Missing values: {}", path.display());
    }
    if let Some(path) = &written.correlation_csv {
        println!("- Correlation: {}", path.display());
    }
    if !written.category_csvs.is_empty() {
        println!(
            "- Top categories: {} file(s) in {}",
            written.category_csvs.len(),
            config.out_dir.join("top_categories").display()
        );
    }
    if let Some(path) = &written.json_summary {
        println!("- JSON summary: {}", path.display());
    }
    println!();
    println!(
        "Quality score: {:.2} ({} rows x {} columns)",
        quality.score, report.summary.row_count, report.summary.column_count
    );
    for (flag, raised) in quality.boolean_flags() {
        if raised {
            println!("  ! {}", flag);
        }
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{:.4}", v))
}

/// Render the flattened summary as an aligned text table.
fn format_summary_table(summary: &DatasetSummary) -> String {
    const HEADERS: [&str; 12] = [
        "name",
        "dtype",
        "non_null",
        "missing",
        "missing_share",
        "unique",
        "is_numeric",
        "zeros",
        "min",
        "max",
        "mean",
        "std",
    ];

    let rows: Vec<[String; 12]> = summary
        .flatten()
        .into_iter()
        .map(|r: SummaryRow| {
            [
                r.name,
                r.dtype,
                r.non_null.to_string(),
                r.missing.to_string(),
                format!("{:.4}", r.missing_share),
                r.unique.to_string(),
                r.is_numeric.to_string(),
                r.zeros.to_string(),
                cell(r.min),
                cell(r.max),
                cell(r.mean),
                cell(r.std),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{:>w$}", c, w = w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_line(HEADERS.to_vec());
    for row in &rows {
        push_line(row.iter().map(String::as_str).collect());
    }

    out
}
