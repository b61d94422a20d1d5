//! Typed configuration for a trigger analysis run.
//!
//! Mirrors the per-country/per-season YAML configuration the analysis
//! notebooks carry: column mapping, filters, sweep range, stakeholder
//! bad-year lists, and the valuation/risk policy. Everything is loaded
//! up front, validated, and then passed by reference into pure engine
//! calls - no ambient state.

pub mod dataset;
pub mod policy;
pub mod validation;

pub use dataset::{DatasetSchema, PredictandKind};
pub use policy::{OutcomeValues, RiskPolicy, Severity, TriggerPolicy};

use aat_common::{Error, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Grouping level for classification partitions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// One pooled partition across every admin unit.
    National,
    /// One partition per admin unit.
    Regional,
}

impl std::fmt::Display for Grouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grouping::National => write!(f, "national"),
            Grouping::Regional => write!(f, "regional"),
        }
    }
}

/// Row filtering applied during adaptation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Keep the not-yet-realized latest season in the observation set.
    #[serde(default)]
    pub include_upcoming: bool,

    /// Optional allow-list of admin unit keys; None keeps every unit.
    #[serde(default)]
    pub admin1_list: Option<Vec<String>>,
}

/// Frequency sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Candidate trigger frequencies, percent, strictly ascending.
    pub frequencies: Vec<f64>,

    /// Severities to evaluate; each selects its bad-years set.
    #[serde(default = "default_severities")]
    pub severities: Vec<Severity>,

    /// Grouping levels, evaluated national first.
    #[serde(default = "default_groupings")]
    pub groupings: Vec<Grouping>,
}

fn default_severities() -> Vec<Severity> {
    vec![Severity::Moderate, Severity::High]
}

fn default_groupings() -> Vec<Grouping> {
    vec![Grouping::National, Grouping::Regional]
}

/// Root configuration for a trigger analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub dataset: DatasetSchema,

    #[serde(default)]
    pub filters: FilterSettings,

    pub sweep: SweepSettings,

    /// Stakeholder bad-year lists per severity. A listed severity takes
    /// precedence over the predictand column; an unlisted one falls back
    /// to the column.
    #[serde(default)]
    pub bad_years: BTreeMap<Severity, BTreeSet<i32>>,

    #[serde(default)]
    pub trigger: TriggerPolicy,

    #[serde(default)]
    pub values: OutcomeValues,

    pub risk: RiskPolicy,
}

impl AnalysisConfig {
    /// Parse and validate a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_yaml::from_str(text).map_err(|e| Error::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Cross-field validation; see `validation`.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}
