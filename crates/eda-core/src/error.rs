//! Error types for loading datasets and producing reports.
//!
//! The profiling engine itself never fails: it degrades to empty or absent
//! results. Everything that can fail lives at its edges (reading CSV input,
//! validating configuration, writing report files) and reports through
//! [`EdaError`].
//!
//! Errors are serializable so the HTTP service can return them as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for dataset loading and reporting.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The input file does not exist.
    #[error("File '{}' not found", .0.display())]
    FileNotFound(PathBuf),

    /// The input bytes could not be parsed into a table.
    #[error("Failed to read CSV: {0}")]
    UnreadableInput(String),

    /// The input parsed but holds no data rows.
    #[error("CSV file contains no data rows")]
    EmptyDataset,

    /// A table could not be assembled from the given columns.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing one of the report artifacts failed.
    #[error("Failed to write report: {0}")]
    ReportWriteFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for API consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::UnreadableInput(_) => "UNREADABLE_INPUT",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidTable(_) => "INVALID_TABLE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportWriteFailed(_) => "REPORT_WRITE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by the caller's input rather than by
    /// the system.
    ///
    /// The CLI maps user errors to exit code 2 and the HTTP service maps them
    /// to `400 Bad Request`.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::FileNotFound(_)
            | Self::UnreadableInput(_)
            | Self::EmptyDataset
            | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_user_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for loading and reporting operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(EdaError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            EdaError::UnreadableInput("bad quote".to_string()).error_code(),
            "UNREADABLE_INPUT"
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(EdaError::EmptyDataset.is_user_error());
        assert!(EdaError::FileNotFound(PathBuf::from("missing.csv")).is_user_error());
        assert!(!EdaError::ReportWriteFailed("disk full".to_string()).is_user_error());
    }

    #[test]
    fn test_file_not_found_message() {
        let error = EdaError::FileNotFound(PathBuf::from("data/missing.csv"));
        assert_eq!(error.to_string(), "File 'data/missing.csv' not found");
    }

    #[test]
    fn test_error_serialization() {
        let error = EdaError::InvalidTable("duplicate column 'age'".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_TABLE"));
        assert!(json.contains("age"));
    }

    #[test]
    fn test_with_context_preserves_code_and_kind() {
        let error = EdaError::UnreadableInput("unterminated quote".to_string())
            .with_context("Loading upload.csv");
        assert!(error.to_string().contains("Loading upload.csv"));
        assert_eq!(error.error_code(), "UNREADABLE_INPUT");
        assert!(error.is_user_error());
    }
}
