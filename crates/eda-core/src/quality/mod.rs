//! Data quality scoring module.
//!
//! This module turns a dataset summary and its missingness table into a
//! heuristic score with named flags and the offending columns.

mod scorer;

pub use scorer::{
    FEW_ROWS_PENALTY, QualityScorer, READINESS_THRESHOLD, RULE_PENALTY, assess_readiness,
    json_summary, score_quality, score_quality_with,
};
