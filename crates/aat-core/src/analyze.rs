//! Threshold/quantile analysis.
//!
//! Splits predictor values (or trigger differences) into triggered and
//! not-triggered groups and computes per-group quantile tables, five-number
//! summaries, and full sorted distributions for box-plot rendering. Feeds
//! threshold-protocol discussions: how far from the boundary do triggered
//! years actually sit?

use crate::classify::{OutcomeTable, Scope};
use aat_common::{Error, Result, SCHEMA_VERSION};
use aat_math::{five_number_summary, quantile_sorted, sort_values, FiveNumberSummary};
use serde::{Deserialize, Serialize};

/// Which side of the trigger boundary a group collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerGroup {
    Triggered,
    NotTriggered,
}

impl std::fmt::Display for TriggerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerGroup::Triggered => write!(f, "triggered"),
            TriggerGroup::NotTriggered => write!(f, "not_triggered"),
        }
    }
}

/// Value column the analyzer ran over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Predictor,
    TriggerDifference,
}

/// One (probability, value) quantile point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantilePoint {
    pub prob: f64,
    pub value: f64,
}

/// Quantile table plus distribution for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDistribution {
    pub group: TriggerGroup,
    pub count: usize,
    /// Requested quantiles; empty for an empty group.
    pub quantiles: Vec<QuantilePoint>,
    /// Box-plot summary; None for an empty group.
    pub summary: Option<FiveNumberSummary>,
    /// Full distribution, sorted ascending.
    pub values: Vec<f64>,
}

/// Triggered vs not-triggered distribution analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAnalysis {
    pub triggered: GroupDistribution,
    pub not_triggered: GroupDistribution,
}

/// Analysis of one classified partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionAnalysis {
    pub scope: Scope,
    #[serde(flatten)]
    pub analysis: ThresholdAnalysis,
}

/// Quantile report across partitions, for external rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileReport {
    pub schema_version: String,
    pub frequency: f64,
    pub source: ValueSource,
    pub partitions: Vec<PartitionAnalysis>,
}

fn group_distribution(group: TriggerGroup, values: Vec<f64>, probs: &[f64]) -> GroupDistribution {
    let sorted = sort_values(&values);
    let quantiles = probs
        .iter()
        .filter_map(|&prob| {
            quantile_sorted(&sorted, prob).map(|value| QuantilePoint { prob, value })
        })
        .collect();
    GroupDistribution {
        group,
        count: sorted.len(),
        quantiles,
        summary: five_number_summary(&sorted),
        values: sorted,
    }
}

/// Split values by trigger flag and compute per-group quantiles.
///
/// Probabilities must each lie in [0, 1]; an empty group yields an empty
/// quantile table rather than an error.
pub fn analyze(values: &[f64], triggered: &[bool], probs: &[f64]) -> Result<ThresholdAnalysis> {
    if values.len() != triggered.len() {
        return Err(Error::Analysis(format!(
            "values ({}) and triggered flags ({}) differ in length",
            values.len(),
            triggered.len()
        )));
    }
    for &prob in probs {
        if !(0.0..=1.0).contains(&prob) || prob.is_nan() {
            return Err(Error::InvalidProbability { prob });
        }
    }

    let mut triggered_values = Vec::new();
    let mut other_values = Vec::new();
    for (&value, &flag) in values.iter().zip(triggered) {
        if flag {
            triggered_values.push(value);
        } else {
            other_values.push(value);
        }
    }

    Ok(ThresholdAnalysis {
        triggered: group_distribution(TriggerGroup::Triggered, triggered_values, probs),
        not_triggered: group_distribution(TriggerGroup::NotTriggered, other_values, probs),
    })
}

/// Analyze a classified partition over the chosen value column.
pub fn analyze_table(
    table: &OutcomeTable,
    probs: &[f64],
    source: ValueSource,
) -> Result<PartitionAnalysis> {
    let values: Vec<f64> = table
        .rows
        .iter()
        .map(|row| match source {
            ValueSource::Predictor => row.predictor_value,
            ValueSource::TriggerDifference => row.trigger_difference,
        })
        .collect();
    let flags: Vec<bool> = table.rows.iter().map(|row| row.triggered).collect();
    Ok(PartitionAnalysis {
        scope: table.scope.clone(),
        analysis: analyze(&values, &flags, probs)?,
    })
}

/// Assemble a quantile report across classified partitions.
pub fn quantile_report(
    tables: &[OutcomeTable],
    probs: &[f64],
    frequency: f64,
    source: ValueSource,
) -> Result<QuantileReport> {
    let partitions = tables
        .iter()
        .map(|table| analyze_table(table, probs, source))
        .collect::<Result<Vec<_>>>()?;
    Ok(QuantileReport {
        schema_version: SCHEMA_VERSION.to_string(),
        frequency,
        source,
        partitions,
    })
}
