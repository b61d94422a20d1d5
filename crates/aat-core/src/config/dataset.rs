//! Dataset column mapping.
//!
//! The Design Tool export names its columns per country and season; the
//! engine never assumes fixed names. Every lookup goes through this mapping.

use aat_math::TriggerDirection;
use serde::{Deserialize, Serialize};

/// How the predictand column encodes bad years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictandKind {
    /// Boolean indicator column: truthy marks a stakeholder bad year.
    Indicator,
    /// Raw numeric column with its own bad-year cutoff.
    Value {
        bad_year_threshold: f64,
        #[serde(default)]
        direction: TriggerDirection,
    },
}

impl Default for PredictandKind {
    fn default() -> Self {
        PredictandKind::Indicator
    }
}

/// Column mapping for the exported dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Forecast variable column, e.g. "pnep".
    pub predictor: String,

    /// Predictand column: bad-year indicator or raw value.
    pub predictand: String,

    #[serde(default)]
    pub predictand_kind: PredictandKind,

    /// Season year column.
    #[serde(default = "default_year_column")]
    pub year: String,

    /// Admin unit key column.
    #[serde(default = "default_unit_key_column")]
    pub unit_key: String,

    /// Admin unit display label column.
    #[serde(default = "default_unit_label_column")]
    pub unit_label: String,

    /// Zero-based month index at which the forecast is issued (0 = January).
    pub issue_month0: u8,
}

fn default_year_column() -> String {
    "year".to_string()
}

fn default_unit_key_column() -> String {
    "key".to_string()
}

fn default_unit_label_column() -> String {
    "label".to_string()
}

impl DatasetSchema {
    /// Short month label ("Jan".."Dec") for the issue month.
    pub fn issue_month_label(&self) -> String {
        self.issue_month0
            .checked_add(1)
            .and_then(|m| chrono::Month::try_from(m).ok())
            .map(|m| m.name()[..3].to_string())
            .unwrap_or_else(|| format!("month{}", self.issue_month0))
    }
}
