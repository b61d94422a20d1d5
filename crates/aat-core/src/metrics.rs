//! Decision metrics aggregation.
//!
//! Derives accuracy, sensitivity, specificity, Expected Value, and the
//! Risk-Adjusted Return on Prediction from the four outcome counts. Every
//! ratio guards its denominator: an empty count sum yields None (serialized
//! as null), never a division error.

use crate::classify::{Outcome, Scope};
use crate::config::{OutcomeValues, RiskPolicy, Severity};
use serde::{Deserialize, Serialize};

/// Outcome tallies for one (severity, frequency, scope) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub worthy_action: u32,
    pub act_in_vain: u32,
    pub fail_to_act: u32,
    pub worthy_inaction: u32,
}

impl OutcomeCounts {
    /// Total classified observations.
    pub fn total(&self) -> u32 {
        self.worthy_action + self.act_in_vain + self.fail_to_act + self.worthy_inaction
    }

    /// Record one outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::WorthyAction => self.worthy_action += 1,
            Outcome::ActInVain => self.act_in_vain += 1,
            Outcome::FailToAct => self.fail_to_act += 1,
            Outcome::WorthyInaction => self.worthy_inaction += 1,
        }
    }
}

/// Decision metrics for one admin-unit × frequency × severity cell.
///
/// Derived strictly from the four counts plus configured weights - no
/// hidden state. `ev_norm` is filled by `normalize_ev` over a row set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub severity: Severity,
    pub frequency: f64,
    pub scope: Scope,

    #[serde(flatten)]
    pub counts: OutcomeCounts,

    pub accuracy: Option<f64>,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
    pub ev: Option<f64>,
    pub ev_norm: Option<f64>,
    pub reward: Option<f64>,
    pub risk: Option<f64>,
    pub rarop: Option<f64>,
}

fn ratio(numerator: u32, denominator: u32) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(f64::from(numerator) / f64::from(denominator))
    }
}

/// Risk-adjusted return: reward penalized by the incorrect-decision share
/// scaled by tolerance. Zero tolerance saturates to the configured penalty.
fn risk_adjusted_return(reward: f64, risk_share: f64, policy: &RiskPolicy) -> f64 {
    if policy.risk_tolerance > 0.0 {
        reward - risk_share / policy.risk_tolerance
    } else {
        reward - policy.zero_tolerance_penalty
    }
}

/// Aggregate outcome counts into a metrics row.
///
/// With all-zero counts every metric is None; no arithmetic failure.
pub fn aggregate(
    severity: Severity,
    frequency: f64,
    scope: Scope,
    counts: OutcomeCounts,
    values: &OutcomeValues,
    risk: &RiskPolicy,
) -> MetricsRow {
    let total = counts.total();
    let correct = counts.worthy_action + counts.worthy_inaction;
    let incorrect = counts.act_in_vain + counts.fail_to_act;

    let accuracy = ratio(correct, total);
    let sensitivity = ratio(counts.worthy_action, counts.worthy_action + counts.fail_to_act);
    let specificity = ratio(counts.worthy_inaction, counts.worthy_inaction + counts.act_in_vain);

    let ev = (total > 0).then(|| {
        f64::from(counts.worthy_action) * values.worthy_action
            + f64::from(counts.act_in_vain) * values.act_in_vain
            + f64::from(counts.worthy_inaction) * values.worthy_inaction
            + f64::from(counts.fail_to_act) * values.fail_to_act
    });

    let reward = ratio(correct, total);
    let risk_share = ratio(incorrect, total);
    let rarop = match (reward, risk_share) {
        (Some(rw), Some(rk)) => Some(risk_adjusted_return(rw, rk, risk)),
        _ => None,
    };

    MetricsRow {
        severity,
        frequency,
        scope,
        counts,
        accuracy,
        sensitivity,
        specificity,
        ev,
        ev_norm: None,
        reward,
        risk: risk_share,
        rarop,
    }
}

/// Min-max normalize EV across a row set into `ev_norm`.
///
/// A degenerate span (all EVs equal, or fewer than one defined EV) leaves
/// every `ev_norm` as None.
pub fn normalize_ev(rows: &mut [MetricsRow]) {
    let defined: Vec<f64> = rows.iter().filter_map(|row| row.ev).collect();
    let Some(min) = defined.iter().cloned().reduce(f64::min) else {
        return;
    };
    let max = defined.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if !(span > 0.0) || !span.is_finite() {
        return;
    }
    for row in rows {
        row.ev_norm = row.ev.map(|ev| (ev - min) / span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(wa: u32, av: u32, fa: u32, wi: u32) -> OutcomeCounts {
        OutcomeCounts {
            worthy_action: wa,
            act_in_vain: av,
            fail_to_act: fa,
            worthy_inaction: wi,
        }
    }

    fn row(c: OutcomeCounts) -> MetricsRow {
        aggregate(
            Severity::Moderate,
            50.0,
            Scope::National,
            c,
            &OutcomeValues::default(),
            &RiskPolicy::default(),
        )
    }

    #[test]
    fn test_perfect_classification() {
        let metrics = row(counts(2, 0, 0, 2));
        assert_eq!(metrics.accuracy, Some(1.0));
        assert_eq!(metrics.sensitivity, Some(1.0));
        assert_eq!(metrics.specificity, Some(1.0));
        assert_eq!(metrics.reward, Some(1.0));
        assert_eq!(metrics.risk, Some(0.0));
        // Reward 1, risk 0, tolerance 0.5
        assert_eq!(metrics.rarop, Some(1.0));
        // 2*1.0 + 2*1.0 with default weights
        assert_eq!(metrics.ev, Some(4.0));
    }

    #[test]
    fn test_all_zero_counts_all_undefined() {
        let metrics = row(counts(0, 0, 0, 0));
        assert_eq!(metrics.accuracy, None);
        assert_eq!(metrics.sensitivity, None);
        assert_eq!(metrics.specificity, None);
        assert_eq!(metrics.ev, None);
        assert_eq!(metrics.ev_norm, None);
        assert_eq!(metrics.reward, None);
        assert_eq!(metrics.risk, None);
        assert_eq!(metrics.rarop, None);
    }

    #[test]
    fn test_sensitivity_undefined_without_bad_years() {
        // No bad years in the partition: WA + FA = 0.
        let metrics = row(counts(0, 1, 0, 3));
        assert_eq!(metrics.sensitivity, None);
        assert_eq!(metrics.accuracy, Some(0.75));
        assert_eq!(metrics.specificity, Some(0.75));
    }

    #[test]
    fn test_specificity_undefined_without_good_years() {
        let metrics = row(counts(2, 0, 2, 0));
        assert_eq!(metrics.specificity, None);
        assert_eq!(metrics.sensitivity, Some(0.5));
    }

    #[test]
    fn test_ev_uses_configured_weights() {
        let values = OutcomeValues {
            worthy_action: 5.0,
            act_in_vain: -2.0,
            worthy_inaction: 1.0,
            fail_to_act: -7.0,
        };
        let metrics = aggregate(
            Severity::High,
            20.0,
            Scope::National,
            counts(1, 2, 1, 3),
            &values,
            &RiskPolicy::default(),
        );
        assert_eq!(metrics.ev, Some(5.0 - 4.0 + 3.0 - 7.0));
    }

    #[test]
    fn test_rarop_scales_with_tolerance() {
        let c = counts(1, 1, 0, 2);
        // reward = 3/4, risk = 1/4
        let tolerant = aggregate(
            Severity::Moderate,
            50.0,
            Scope::National,
            c,
            &OutcomeValues::default(),
            &RiskPolicy {
                risk_tolerance: 1.0,
                zero_tolerance_penalty: 10.0,
            },
        );
        assert_eq!(tolerant.rarop, Some(0.75 - 0.25));

        let strict = aggregate(
            Severity::Moderate,
            50.0,
            Scope::National,
            c,
            &OutcomeValues::default(),
            &RiskPolicy {
                risk_tolerance: 0.25,
                zero_tolerance_penalty: 10.0,
            },
        );
        assert_eq!(strict.rarop, Some(0.75 - 1.0));
    }

    #[test]
    fn test_rarop_zero_tolerance_penalty() {
        let metrics = aggregate(
            Severity::Moderate,
            50.0,
            Scope::National,
            counts(2, 0, 0, 2),
            &OutcomeValues::default(),
            &RiskPolicy {
                risk_tolerance: 0.0,
                zero_tolerance_penalty: 10.0,
            },
        );
        assert_eq!(metrics.rarop, Some(1.0 - 10.0));
    }

    #[test]
    fn test_normalize_ev() {
        let mut rows = vec![row(counts(4, 0, 0, 0)), row(counts(2, 2, 0, 0)), row(counts(0, 4, 0, 0))];
        // EVs: 4, 0, -4 with default weights
        normalize_ev(&mut rows);
        assert_eq!(rows[0].ev_norm, Some(1.0));
        assert_eq!(rows[1].ev_norm, Some(0.5));
        assert_eq!(rows[2].ev_norm, Some(0.0));
    }

    #[test]
    fn test_normalize_ev_degenerate_span() {
        let mut rows = vec![row(counts(1, 0, 0, 1)), row(counts(1, 0, 0, 1))];
        normalize_ev(&mut rows);
        assert_eq!(rows[0].ev_norm, None);
        assert_eq!(rows[1].ev_norm, None);
    }

    #[test]
    fn test_metrics_serialize_undefined_as_null() {
        let metrics = row(counts(0, 0, 0, 0));
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["accuracy"], serde_json::Value::Null);
        assert_eq!(json["rarop"], serde_json::Value::Null);
        assert_eq!(json["worthy_action"], serde_json::json!(0));
    }
}
