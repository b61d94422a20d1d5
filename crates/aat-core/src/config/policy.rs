//! Trigger, valuation, and risk policy types.
//!
//! Outcome weights and the RARoP risk adjustment are program policy decided
//! with stakeholders, never constants. They enter every aggregation call as
//! explicit parameters.

use aat_math::TriggerDirection;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Severity tier selecting a bad-years set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Moderate,
    High,
}

impl Severity {
    pub const ALL: [Severity; 2] = [Severity::Moderate, Severity::High];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Moderate => write!(f, "moderate"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Trigger boundary policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerPolicy {
    /// Which tail of the predictor counts as severe.
    #[serde(default)]
    pub direction: TriggerDirection,

    /// Additive threshold-protocol offset applied on top of the computed
    /// threshold; classified rows also report whether they would trigger
    /// against the adjusted boundary.
    #[serde(default)]
    pub threshold_protocol: f64,
}

/// Cost/benefit weight per outcome category, in program currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeValues {
    pub worthy_action: f64,
    pub act_in_vain: f64,
    pub worthy_inaction: f64,
    pub fail_to_act: f64,
}

impl Default for OutcomeValues {
    fn default() -> Self {
        OutcomeValues {
            worthy_action: 1.0,
            act_in_vain: -1.0,
            worthy_inaction: 1.0,
            fail_to_act: -1.0,
        }
    }
}

/// Risk adjustment policy for RARoP.
///
/// RARoP = reward - risk / risk_tolerance for tolerance in (0, 1]; a
/// tolerance of exactly 0 saturates the volatility penalty to
/// `zero_tolerance_penalty` instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Tolerance for incorrect decisions, in [0, 1].
    pub risk_tolerance: f64,

    /// Penalty substituted for the volatility term at zero tolerance.
    #[serde(default = "default_zero_tolerance_penalty")]
    pub zero_tolerance_penalty: f64,
}

fn default_zero_tolerance_penalty() -> f64 {
    10.0
}

impl Default for RiskPolicy {
    fn default() -> Self {
        RiskPolicy {
            risk_tolerance: 0.5,
            zero_tolerance_penalty: default_zero_tolerance_penalty(),
        }
    }
}
