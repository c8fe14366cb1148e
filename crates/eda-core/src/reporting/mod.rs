//! Report generation module.
//!
//! This module runs every profiling step over a table and writes the results
//! to an output directory.
//!
//! # Full Reports
//!
//! Use [`FullReport`] to collect all results in one value suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - The report files written by [`ReportGenerator`]
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,no_run
//! use eda_core::config::ReportConfig;
//! use eda_core::loader::load_csv;
//! use eda_core::reporting::{FullReport, ReportGenerator};
//!
//! # fn main() -> eda_core::Result<()> {
//! let config = ReportConfig::builder().out_dir("reports").build()?;
//! let table = load_csv("data/train.csv", &config.load)?;
//!
//! let report = FullReport::build("data/train.csv", &table, &config);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let written = ReportGenerator::new(&config.out_dir).write_all(&report, &config)?;
//! println!("Markdown report: {}", written.markdown.display());
//! # Ok(())
//! # }
//! ```

mod generator;
mod markdown;

pub use generator::{FullReport, ReportGenerator, WrittenReport};
pub use markdown::render_markdown;
