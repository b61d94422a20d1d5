//! Frequency sweep engine.
//!
//! Repeats classification across the configured candidate frequencies, both
//! severities, and every grouping level. Each (severity, frequency, scope)
//! unit is an independent pure call; the report is assembled in canonical
//! order (severity, frequency ascending, scope) regardless of evaluation
//! order, so output is deterministic and a run is idempotent.
//!
//! A partition that cannot support a percentile fails alone: the failure is
//! recorded with full context and the sweep continues.

use crate::adapt::Observation;
use crate::classify::{classify_partition, partitions, Scope};
use crate::config::{AnalysisConfig, Grouping, Severity};
use crate::metrics::{aggregate, normalize_ev, MetricsRow};
use aat_common::{Error, Result, StructuredError, SCHEMA_VERSION};
use aat_math::TriggerDirection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An outcome table annotated with its sweep coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepTable {
    pub severity: Severity,
    #[serde(flatten)]
    pub table: crate::classify::OutcomeTable,
}

/// One failed sweep partition with localization context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionFailure {
    pub severity: Severity,
    pub frequency: f64,
    pub scope: Scope,
    pub error: StructuredError,
}

/// Aggregate accounting for a sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Partitions attempted across all (severity, frequency, grouping) units.
    pub partitions_total: usize,
    pub partitions_succeeded: usize,
    pub partitions_failed: usize,
    pub all_succeeded: bool,
}

/// Sweep output: outcome tables, metrics, failures, accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub schema_version: String,
    pub issue_month: String,
    pub direction: TriggerDirection,
    pub tables: Vec<SweepTable>,
    pub metrics: Vec<MetricsRow>,
    pub failures: Vec<PartitionFailure>,
    pub summary: SweepSummary,
}

/// Coordinates of one independent sweep unit.
///
/// Units carry no shared state; they may be evaluated in any order or in
/// parallel without changing the assembled report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepUnit {
    pub severity: Severity,
    pub frequency: f64,
    pub grouping: Grouping,
}

/// Enumerate sweep units lazily, in canonical order.
///
/// Canonical order is severity, then frequency ascending, then grouping
/// (national before regional). The iterator is a pure function of the
/// configuration: restarting it yields the same finite sequence.
pub fn sweep_units(config: &AnalysisConfig) -> impl Iterator<Item = SweepUnit> {
    let mut severities = config.sweep.severities.clone();
    severities.sort_unstable();
    let frequencies = config.sweep.frequencies.clone();
    let mut groupings = config.sweep.groupings.clone();
    groupings.sort_unstable();

    severities.into_iter().flat_map(move |severity| {
        let frequencies = frequencies.clone();
        let groupings = groupings.clone();
        frequencies.into_iter().flat_map(move |frequency| {
            groupings
                .clone()
                .into_iter()
                .map(move |grouping| SweepUnit {
                    severity,
                    frequency,
                    grouping,
                })
        })
    })
}

/// Re-label observations against a severity's stakeholder bad-year list.
///
/// An unlisted severity keeps the predictand-column labels the adapter
/// produced.
fn relabel_for_severity(
    observations: &[Observation],
    severity: Severity,
    config: &AnalysisConfig,
) -> Vec<Observation> {
    match config.bad_years.get(&severity) {
        Some(years) => observations
            .iter()
            .map(|obs| Observation {
                is_bad_year: years.contains(&obs.year),
                ..obs.clone()
            })
            .collect(),
        None => observations.to_vec(),
    }
}

/// Run the full frequency sweep over an adapted observation set.
///
/// Validates the configuration, then classifies every (severity, frequency,
/// scope) unit and aggregates its metrics. EV normalization runs over the
/// assembled metric rows at the end.
pub fn sweep(observations: &[Observation], config: &AnalysisConfig) -> Result<SweepReport> {
    config.validate()?;
    if observations.is_empty() {
        return Err(Error::EmptyDataset);
    }

    // One re-labeled observation set per severity; shared read-only by the
    // units that reference it.
    let mut labeled: BTreeMap<Severity, Vec<Observation>> = BTreeMap::new();
    for &severity in &config.sweep.severities {
        labeled.insert(severity, relabel_for_severity(observations, severity, config));
    }

    let mut tables = Vec::new();
    let mut metrics = Vec::new();
    let mut failures = Vec::new();
    let mut failed_units: BTreeSet<(Severity, String)> = BTreeSet::new();

    for unit in sweep_units(config) {
        let observations = &labeled[&unit.severity];
        for (scope, partition) in partitions(observations, unit.grouping) {
            match classify_partition(scope.clone(), &partition, unit.frequency, &config.trigger) {
                Ok(table) => {
                    metrics.push(aggregate(
                        unit.severity,
                        unit.frequency,
                        scope,
                        table.counts(),
                        &config.values,
                        &config.risk,
                    ));
                    tables.push(SweepTable {
                        severity: unit.severity,
                        table,
                    });
                }
                Err(err) => {
                    failed_units.insert((unit.severity, scope.to_string()));
                    failures.push(PartitionFailure {
                        severity: unit.severity,
                        frequency: unit.frequency,
                        scope,
                        error: StructuredError::from(&err),
                    });
                }
            }
        }
    }

    normalize_ev(&mut metrics);

    let summary = SweepSummary {
        partitions_total: tables.len() + failures.len(),
        partitions_succeeded: tables.len(),
        partitions_failed: failures.len(),
        all_succeeded: failures.is_empty(),
    };

    if !failures.is_empty() {
        tracing::warn!(
            failed_partitions = failures.len(),
            units = ?failed_units,
            "sweep completed with failed partitions"
        );
    }

    Ok(SweepReport {
        schema_version: SCHEMA_VERSION.to_string(),
        issue_month: config.dataset.issue_month_label(),
        direction: config.trigger.direction,
        tables,
        metrics,
        failures,
        summary,
    })
}
