//! Trigger classification.
//!
//! For a candidate frequency, computes the predictor-value threshold per
//! grouping partition and labels every observation with one of the four
//! decision outcomes crossing (triggered) × (bad year).
//!
//! Threshold rule: the linear-interpolation quantile of the partition's
//! predictor values at the severe-tail probability for the frequency;
//! the trigger test is inclusive, so ties at the threshold all trigger.
//! Output rows are ordered by year ascending, then unit id.

use crate::adapt::Observation;
use crate::config::{Grouping, TriggerPolicy};
use crate::metrics::OutcomeCounts;
use aat_common::{Error, Result};
use aat_math::trigger_threshold;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The four decision outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Triggered and the year was bad.
    WorthyAction,
    /// Triggered but the year was not bad.
    ActInVain,
    /// Not triggered but the year was bad.
    FailToAct,
    /// Not triggered and the year was not bad.
    WorthyInaction,
}

impl Outcome {
    /// The unique outcome for a (triggered, bad year) pair.
    pub fn from_flags(triggered: bool, is_bad_year: bool) -> Self {
        match (triggered, is_bad_year) {
            (true, true) => Outcome::WorthyAction,
            (true, false) => Outcome::ActInVain,
            (false, true) => Outcome::FailToAct,
            (false, false) => Outcome::WorthyInaction,
        }
    }

    /// Stakeholder-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::WorthyAction => "Worthy Action",
            Outcome::ActInVain => "Act in Vain",
            Outcome::FailToAct => "Fail to Act",
            Outcome::WorthyInaction => "Worthy Inaction",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Partition key for classification.
///
/// Ordering puts the national partition before every unit partition, and
/// unit partitions in unit-id order - the canonical assembly order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Scope {
    National,
    Unit { id: String, name: String },
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::National => write!(f, "national"),
            Scope::Unit { id, .. } => f.write_str(id),
        }
    }
}

/// One classified observation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub year: i32,
    pub unit_id: String,
    pub unit_name: String,
    pub predictor_value: f64,
    /// Predictor minus threshold; negative means below the boundary.
    pub trigger_difference: f64,
    pub triggered: bool,
    /// Trigger test against the protocol-adjusted threshold.
    pub triggered_adjusted: bool,
    pub is_bad_year: bool,
    pub outcome: Outcome,
}

/// Classified partition: threshold plus one row per observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTable {
    pub scope: Scope,
    pub frequency: f64,
    pub threshold: f64,
    pub adjusted_threshold: f64,
    pub rows: Vec<OutcomeRow>,
}

impl OutcomeTable {
    /// Tally the four outcome counts.
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for row in &self.rows {
            counts.record(row.outcome);
        }
        counts
    }

    /// Number of triggered rows.
    pub fn triggered_count(&self) -> usize {
        self.rows.iter().filter(|row| row.triggered).count()
    }
}

/// Split observations into grouping partitions in canonical order.
pub fn partitions(
    observations: &[Observation],
    grouping: Grouping,
) -> Vec<(Scope, Vec<Observation>)> {
    match grouping {
        Grouping::National => vec![(Scope::National, observations.to_vec())],
        Grouping::Regional => {
            let mut by_unit: std::collections::BTreeMap<(String, String), Vec<Observation>> =
                std::collections::BTreeMap::new();
            for obs in observations {
                by_unit
                    .entry((obs.unit_id.clone(), obs.unit_name.clone()))
                    .or_default()
                    .push(obs.clone());
            }
            by_unit
                .into_iter()
                .map(|((id, name), obs)| (Scope::Unit { id, name }, obs))
                .collect()
        }
    }
}

/// Classify every observation of one partition at a candidate frequency.
///
/// Fails with an invalid-frequency error outside (0, 100] and an
/// insufficient-data error when the partition has fewer than 2 distinct
/// years (a percentile over a single year is meaningless).
pub fn classify_partition(
    scope: Scope,
    observations: &[Observation],
    frequency: f64,
    policy: &TriggerPolicy,
) -> Result<OutcomeTable> {
    if !(frequency > 0.0 && frequency <= 100.0) {
        return Err(Error::InvalidFrequency { frequency });
    }

    let distinct_years: BTreeSet<i32> = observations.iter().map(|o| o.year).collect();
    if distinct_years.len() < 2 {
        return Err(Error::InsufficientData {
            scope: scope.to_string(),
            distinct_years: distinct_years.len(),
        });
    }

    let values: Vec<f64> = observations.iter().map(|o| o.predictor_value).collect();
    let threshold = trigger_threshold(&values, frequency, policy.direction).ok_or_else(|| {
        Error::Analysis(format!(
            "threshold computation failed for partition '{scope}' at frequency {frequency}"
        ))
    })?;
    let adjusted_threshold = threshold + policy.threshold_protocol;

    let mut rows: Vec<OutcomeRow> = observations
        .iter()
        .map(|obs| {
            let triggered = policy.direction.triggers(obs.predictor_value, threshold);
            OutcomeRow {
                year: obs.year,
                unit_id: obs.unit_id.clone(),
                unit_name: obs.unit_name.clone(),
                predictor_value: obs.predictor_value,
                trigger_difference: obs.predictor_value - threshold,
                triggered,
                triggered_adjusted: policy
                    .direction
                    .triggers(obs.predictor_value, adjusted_threshold),
                is_bad_year: obs.is_bad_year,
                outcome: Outcome::from_flags(triggered, obs.is_bad_year),
            }
        })
        .collect();
    rows.sort_by(|a, b| (a.year, &a.unit_id).cmp(&(b.year, &b.unit_id)));

    Ok(OutcomeTable {
        scope,
        frequency,
        threshold,
        adjusted_threshold,
        rows,
    })
}

/// Classify observations at a candidate frequency across a grouping level.
///
/// National grouping yields one pooled table; regional grouping yields one
/// table per admin unit, in unit-id order. Fails fast on the first failing
/// partition; the sweep engine calls `classify_partition` directly when it
/// needs to continue past failures.
pub fn classify(
    observations: &[Observation],
    frequency: f64,
    grouping: Grouping,
    policy: &TriggerPolicy,
) -> Result<Vec<OutcomeTable>> {
    if !(frequency > 0.0 && frequency <= 100.0) {
        return Err(Error::InvalidFrequency { frequency });
    }
    partitions(observations, grouping)
        .into_iter()
        .map(|(scope, obs)| classify_partition(scope, &obs, frequency, policy))
        .collect()
}
