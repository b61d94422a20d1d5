//! Error types for trigger evaluation.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! Errors can be formatted for human consumption with headline, reason, and fix:
//! ```text
//! ✗ Dataset Schema Error
//!   Reason: required column 'pnep' is missing from the dataset
//!   Fix: Check the predictor/predictand column names in config.yaml against the export header.
//! ```
//!
//! # Machine-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 31,
//!   "category": "classification",
//!   "message": "insufficient data in partition 'ET05': 1 distinct year(s), need 2",
//!   "recoverable": false,
//!   "context": { "scope": "ET05", "distinct_years": 1 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for trigger evaluation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration errors (column mapping, weights, risk policy).
    Config,
    /// Dataset adaptation errors (schema, filtering, duplicates).
    Dataset,
    /// Trigger classification errors (frequency, partition support).
    Classification,
    /// Quantile/threshold analysis errors.
    Analysis,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Dataset => write!(f, "dataset"),
            ErrorCategory::Classification => write!(f, "classification"),
            ErrorCategory::Analysis => write!(f, "analysis"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for trigger evaluation.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Dataset errors (20-29)
    #[error("required column '{column}' is missing from the dataset")]
    Schema { column: String },

    #[error("no observations remain after filtering")]
    EmptyDataset,

    #[error("duplicate observation for year {year} in unit '{unit_id}'")]
    DuplicateObservation { year: i32, unit_id: String },

    // Classification errors (30-39)
    #[error("frequency {frequency} is outside (0, 100]")]
    InvalidFrequency { frequency: f64 },

    #[error("insufficient data in partition '{scope}': {distinct_years} distinct year(s), need 2")]
    InsufficientData { scope: String, distinct_years: usize },

    #[error("quantile probability {prob} is outside [0, 1]")]
    InvalidProbability { prob: f64 },

    #[error("analysis error: {0}")]
    Analysis(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(String),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Dataset errors
    /// - 30-39: Classification/analysis errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::Schema { .. } => 20,
            Error::EmptyDataset => 21,
            Error::DuplicateObservation { .. } => 22,
            Error::InvalidFrequency { .. } => 30,
            Error::InsufficientData { .. } => 31,
            Error::InvalidProbability { .. } => 32,
            Error::Analysis(_) => 33,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Yaml(_) => 62,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) => ErrorCategory::Config,

            Error::Schema { .. } | Error::EmptyDataset | Error::DuplicateObservation { .. } => {
                ErrorCategory::Dataset
            }

            Error::InvalidFrequency { .. } | Error::InsufficientData { .. } => {
                ErrorCategory::Classification
            }

            Error::InvalidProbability { .. } | Error::Analysis(_) => ErrorCategory::Analysis,

            Error::Io(_) | Error::Json(_) | Error::Yaml(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Recoverable errors may be resolved by fixing configuration or input
    /// data and re-running; unrecoverable ones describe the data itself.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Config errors: recoverable by fixing config
            Error::Config(_) => true,

            // Dataset: fixable by correcting column mapping or the export
            Error::Schema { .. } => true,
            Error::EmptyDataset => true,
            Error::DuplicateObservation { .. } => true,

            // Classification: frequency is a caller mistake; support is not
            Error::InvalidFrequency { .. } => true,
            Error::InsufficientData { .. } => false, // The partition has no more years

            // Analysis
            Error::InvalidProbability { .. } => true,
            Error::Analysis(_) => true,

            // I/O: often transient or fixable
            Error::Io(_) => true,
            Error::Json(_) => true,
            Error::Yaml(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'aat-core check' to validate the configuration, or check syntax in config.yaml."
            }
            Error::Schema { .. } => {
                "Check the predictor/predictand column names in config.yaml against the export header."
            }
            Error::EmptyDataset => {
                "Loosen the admin1 allow-list or set include_upcoming, then re-run. Verify the export is non-empty."
            }
            Error::DuplicateObservation { .. } => {
                "The export contains more than one row per (year, unit); re-export a single season/issue month."
            }
            Error::InvalidFrequency { .. } => {
                "Frequencies are percentiles in (0, 100]. Fix the sweep.frequencies list in config.yaml."
            }
            Error::InsufficientData { .. } => {
                "A percentile threshold needs at least 2 distinct years; exclude this unit or extend the record."
            }
            Error::InvalidProbability { .. } => {
                "Quantile probabilities must lie in [0, 1]. Fix the --probs argument."
            }
            Error::Analysis(_) => {
                "Check that values and triggered flags were produced by the same classification run."
            }
            Error::Io(_) => {
                "Check that the dataset and config paths exist and are readable, then retry."
            }
            Error::Json(_) => {
                "Invalid JSON in the dataset file. Check syntax with 'cat <file> | jq .'."
            }
            Error::Yaml(_) => {
                "Invalid YAML in the config file. Check indentation and key names."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::Schema { .. } => "Dataset Schema Error",
            Error::EmptyDataset => "Empty Dataset",
            Error::DuplicateObservation { .. } => "Duplicate Observation",
            Error::InvalidFrequency { .. } => "Invalid Frequency",
            Error::InsufficientData { .. } => "Insufficient Partition Data",
            Error::InvalidProbability { .. } => "Invalid Probability",
            Error::Analysis(_) => "Analysis Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
            Error::Yaml(_) => "YAML Parse Error",
        }
    }
}

/// Structured error response for JSON output.
///
/// Used by machine-readable output modes for parseable error reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., column, scope).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        // Add error-specific context
        match err {
            Error::Schema { column } => {
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::DuplicateObservation { year, unit_id } => {
                context.insert("year".to_string(), serde_json::json!(year));
                context.insert("unit_id".to_string(), serde_json::json!(unit_id));
            }
            Error::InvalidFrequency { frequency } => {
                context.insert("frequency".to_string(), serde_json::json!(frequency));
            }
            Error::InsufficientData {
                scope,
                distinct_years,
            } => {
                context.insert("scope".to_string(), serde_json::json!(scope));
                context.insert("distinct_years".to_string(), serde_json::json!(distinct_years));
            }
            Error::InvalidProbability { prob } => {
                context.insert("prob".to_string(), serde_json::json!(prob));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
