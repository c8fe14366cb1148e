//! Request and response bodies.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Datasets with fewer rows are penalised by the aggregate heuristic.
pub const MIN_ROWS: usize = 1000;
/// Datasets with more columns are penalised by the aggregate heuristic.
pub const MAX_COLUMNS: usize = 100;
/// Missing share above which `too_many_missing` is raised.
pub const MAX_MISSING_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            service: "dataset-quality".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Aggregate dataset features for `POST /quality`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityRequest {
    pub n_rows: usize,
    pub n_cols: usize,
    /// Largest per-column missing share, in `[0, 1]`
    pub max_missing_share: f64,
    pub numeric_cols: usize,
    pub categorical_cols: usize,
}

impl QualityRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(0.0..=1.0).contains(&self.max_missing_share) {
            return Err(ApiError::BadRequest(format!(
                "max_missing_share must be between 0 and 1, got {}",
                self.max_missing_share
            )));
        }
        Ok(())
    }

    /// Heuristic score from the aggregate features, clamped to `[0, 1]`.
    pub fn score(&self) -> f64 {
        let mut score = 1.0 - self.max_missing_share;

        if self.n_rows < MIN_ROWS {
            score -= 0.2;
        }
        if self.n_cols > MAX_COLUMNS {
            score -= 0.1;
        }
        // Skewed feature types
        if self.numeric_cols == 0 && self.categorical_cols > 0 {
            score -= 0.1;
        }
        if self.categorical_cols == 0 && self.numeric_cols > 0 {
            score -= 0.05;
        }

        f64::clamp(score, 0.0, 1.0)
    }

    pub fn flags(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            ("too_few_rows", self.n_rows < MIN_ROWS),
            ("too_many_columns", self.n_cols > MAX_COLUMNS),
            ("too_many_missing", self.max_missing_share > MAX_MISSING_SHARE),
            ("no_numeric_columns", self.numeric_cols == 0),
            ("no_categorical_columns", self.categorical_cols == 0),
        ])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetShape {
    pub n_rows: usize,
    pub n_cols: usize,
}

/// Readiness verdict returned by the quality endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityResponse {
    pub ok_for_model: bool,
    pub quality_score: f64,
    pub message: String,
    pub latency_ms: f64,
    pub flags: BTreeMap<String, bool>,
    pub dataset_shape: DatasetShape,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlagsResponse {
    pub flags: BTreeMap<String, bool>,
}

pub(crate) fn owned_flags(flags: BTreeMap<&'static str, bool>) -> BTreeMap<String, bool> {
    flags
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        n_rows: usize,
        n_cols: usize,
        max_missing_share: f64,
        numeric_cols: usize,
        categorical_cols: usize,
    ) -> QualityRequest {
        QualityRequest {
            n_rows,
            n_cols,
            max_missing_share,
            numeric_cols,
            categorical_cols,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_healthy_dataset() {
        let req = request(5000, 10, 0.1, 5, 5);
        assert_close(req.score(), 0.9);
        assert!(req.flags().values().all(|flag| !flag));
    }

    #[test]
    fn test_penalties_stack() {
        // 1 - 0.3 - 0.2 (rows) - 0.1 (columns) - 0.05 (no categorical)
        let req = request(10, 200, 0.3, 200, 0);
        assert_close(req.score(), 0.35);

        let flags = req.flags();
        assert!(flags["too_few_rows"]);
        assert!(flags["too_many_columns"]);
        assert!(!flags["too_many_missing"]);
        assert!(flags["no_categorical_columns"]);
        assert!(!flags["no_numeric_columns"]);
    }

    #[test]
    fn test_score_is_clamped() {
        let req = request(0, 3, 1.0, 0, 3);
        assert_eq!(req.score(), 0.0);
        assert!(req.flags()["no_numeric_columns"]);
    }

    #[test]
    fn test_validate_share_range() {
        assert!(request(10, 1, 0.5, 1, 0).validate().is_ok());
        assert!(request(10, 1, 1.5, 1, 0).validate().is_err());
        assert!(request(10, 1, f64::NAN, 1, 0).validate().is_err());
    }

    #[test]
    fn test_health_version() {
        assert_eq!(HealthResponse::ok().version, env!("CARGO_PKG_VERSION"));
    }
}
