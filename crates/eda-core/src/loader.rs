//! CSV loading into a [`Table`].
//!
//! Parsing is delegated to polars. Any parse failure surfaces as
//! [`EdaError::UnreadableInput`] so callers can report it as a user error.

use crate::error::{EdaError, Result};
use crate::table::Table;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Character encoding of CSV input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Strict UTF-8; invalid bytes fail the load
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    LossyUtf8,
}

impl From<Encoding> for CsvEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Utf8 => CsvEncoding::Utf8,
            Encoding::LossyUtf8 => CsvEncoding::LossyUtf8,
        }
    }
}

/// Loader configuration: delimiter and encoding are loader concerns only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Field delimiter. Default: `,`
    pub separator: u8,
    /// Input encoding. Default: UTF-8
    pub encoding: Encoding,
    /// Rows used for dtype inference; `None` scans the whole file.
    /// Default: `None`, so a late value of another type widens the column
    /// instead of failing the load
    pub infer_schema_length: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            encoding: Encoding::default(),
            infer_schema_length: None,
        }
    }
}

impl LoadOptions {
    fn read_options(&self, quote_char: Option<u8>) -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(self.separator)
                    .with_quote_char(quote_char)
                    .with_encoding(self.encoding.into()),
            )
    }
}

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EdaError::FileNotFound(path.to_path_buf()));
    }

    info!("Loading dataset from: {}", path.display());
    let df = read_with_fallbacks(options, |read_options| {
        read_options
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
    })?;
    debug!("Dataset loaded: {:?}", df.shape());

    Table::from_dataframe(&df)
}

/// Load CSV content held in memory (e.g. an HTTP upload).
pub fn load_csv_bytes(bytes: &[u8], options: &LoadOptions) -> Result<Table> {
    let df = read_with_fallbacks(options, |read_options| {
        read_options
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
    })?;
    debug!("Dataset parsed from memory: {:?}", df.shape());

    Table::from_dataframe(&df)
}

/// Reject tables without data rows.
///
/// The profiling engine accepts empty tables, but reporting on one is
/// almost always a user mistake.
pub fn ensure_not_empty(table: &Table) -> Result<()> {
    if table.is_empty() {
        Err(EdaError::EmptyDataset)
    } else {
        Ok(())
    }
}

/// Try standard quote handling first, then parse without quoting.
fn read_with_fallbacks<F>(options: &LoadOptions, read: F) -> Result<DataFrame>
where
    F: Fn(CsvReadOptions) -> PolarsResult<DataFrame>,
{
    match read(options.read_options(Some(b'"'))) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    read(options.read_options(None)).map_err(|e| EdaError::UnreadableInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;

    #[test]
    fn test_load_csv_bytes_basic() {
        let csv = b"age,height,city\n10,140,A\n20,150,B\n30,160,A\n,170,\n";
        let table = load_csv_bytes(csv, &LoadOptions::default()).unwrap();

        assert_eq!(table.shape(), (4, 3));
        assert_eq!(table.column("age").unwrap().missing_count(), 1);
        assert_eq!(table.column("city").unwrap().missing_count(), 1);
        assert_eq!(table.column("city").unwrap().kind(), ColumnKind::Text);
        assert!(table.column("height").unwrap().is_numeric());
    }

    #[test]
    fn test_load_csv_bytes_custom_separator() {
        let csv = b"a;b\n1;x\n2;y\n";
        let options = LoadOptions {
            separator: b';',
            ..LoadOptions::default()
        };
        let table = load_csv_bytes(csv, &options).unwrap();

        assert_eq!(table.shape(), (2, 2));
    }

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv("definitely/not/here.csv", &LoadOptions::default());
        assert!(matches!(result, Err(EdaError::FileNotFound(_))));
    }

    #[test]
    fn test_load_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "x,y\n1,2\n3,4\n").unwrap();

        let table = load_csv(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.shape(), (2, 2));
    }

    fn late_value_csv(late: &str) -> Vec<u8> {
        let mut csv = String::from("x,y\n");
        for i in 0..150 {
            csv.push_str(&format!("{},a\n", i));
        }
        csv.push_str(&format!("{},b\n", late));
        csv.into_bytes()
    }

    #[test]
    fn test_late_float_widens_integer_column() {
        let table = load_csv_bytes(&late_value_csv("1.5"), &LoadOptions::default()).unwrap();

        assert_eq!(table.shape(), (151, 2));
        let x = table.column("x").unwrap();
        assert!(x.is_numeric());
        assert_eq!(x.numeric_values().unwrap()[150], Some(1.5));
    }

    #[test]
    fn test_late_text_turns_column_into_text() {
        let table = load_csv_bytes(&late_value_csv("unknown"), &LoadOptions::default()).unwrap();

        let x = table.column("x").unwrap();
        assert_eq!(x.kind(), ColumnKind::Text);
        assert_eq!(x.text_values().unwrap()[150].as_deref(), Some("unknown"));
    }

    #[test]
    fn test_ragged_rows_are_unreadable() {
        let result = load_csv_bytes(b"a,b\n1,2,3\n4,5,6,7\n", &LoadOptions::default());

        let err = result.unwrap_err();
        assert!(matches!(err, EdaError::UnreadableInput(_)));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_invalid_utf8_depends_on_encoding() {
        let csv = b"name,n\ncaf\xe9,1\nbar,2\n";

        let strict = load_csv_bytes(csv, &LoadOptions::default());
        assert!(matches!(strict, Err(EdaError::UnreadableInput(_))));

        let lossy = LoadOptions {
            encoding: Encoding::LossyUtf8,
            ..LoadOptions::default()
        };
        let table = load_csv_bytes(csv, &lossy).unwrap();
        assert_eq!(table.shape(), (2, 2));
    }

    #[test]
    fn test_header_only_csv_is_empty() {
        let table = load_csv_bytes(b"a,b\n", &LoadOptions::default()).unwrap();

        assert!(matches!(
            ensure_not_empty(&table),
            Err(EdaError::EmptyDataset)
        ));
    }
}
