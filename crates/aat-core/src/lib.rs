//! Anticipatory Action Triggers - trigger evaluation and scoring engine.
//!
//! Evaluates candidate drought-forecast triggers against stakeholder-identified
//! bad years:
//! - Adapting exported forecast tables into canonical observations
//! - Classifying observations into four decision outcomes per trigger frequency
//! - Sweeping candidate frequencies across severities and admin groupings
//! - Aggregating confusion-style counts into decision metrics (EV, RARoP)
//! - Splitting predictor distributions by trigger status for threshold protocol work
//!
//! The engine is synchronous and side-effect-free: every operation is a pure
//! function over immutable inputs. Fetching, rendering, and persistence belong
//! to external collaborators; the CLI in `main.rs` is a thin file-in/table-out
//! wrapper around the engine.

pub mod adapt;
pub mod analyze;
pub mod classify;
pub mod config;
pub mod exit_codes;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod sweep;

pub use adapt::{adapt, AdaptedDataset, ExcludedCounts, Observation, RawRecord};
pub use analyze::{
    analyze, analyze_table, quantile_report, GroupDistribution, PartitionAnalysis, QuantilePoint,
    QuantileReport, ThresholdAnalysis, TriggerGroup, ValueSource,
};
pub use classify::{classify, classify_partition, partitions, Outcome, OutcomeRow, OutcomeTable, Scope};
pub use config::{
    AnalysisConfig, DatasetSchema, FilterSettings, Grouping, OutcomeValues, PredictandKind,
    RiskPolicy, Severity, SweepSettings, TriggerPolicy,
};
pub use metrics::{aggregate, normalize_ev, MetricsRow, OutcomeCounts};
pub use sweep::{sweep, sweep_units, PartitionFailure, SweepReport, SweepSummary, SweepTable, SweepUnit};
