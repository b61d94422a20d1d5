//! Trigger-threshold computation at a candidate frequency.
//!
//! A frequency F in (0, 100] means "trigger in the worst F% of years by
//! predictor value". Which tail counts as worst depends on the predictor's
//! semantics: probability-of-non-exceedance style predictors become more
//! severe as they drop, rainfall-total style indices invert that. The
//! direction is configuration, never assumed.

use crate::math::quantile::{quantile_sorted, sort_values};
use serde::{Deserialize, Serialize};

/// Which tail of the predictor distribution counts as severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerDirection {
    /// Lower predictor values are more severe (triggers at or below threshold).
    #[default]
    LowTriggers,
    /// Higher predictor values are more severe (triggers at or above threshold).
    HighTriggers,
}

impl TriggerDirection {
    /// Probability at which the threshold quantile sits for a frequency in (0, 100].
    pub fn tail_probability(self, frequency: f64) -> f64 {
        match self {
            TriggerDirection::LowTriggers => frequency / 100.0,
            TriggerDirection::HighTriggers => 1.0 - frequency / 100.0,
        }
    }

    /// Inclusive trigger test: ties at the threshold all trigger.
    pub fn triggers(self, value: f64, threshold: f64) -> bool {
        match self {
            TriggerDirection::LowTriggers => value <= threshold,
            TriggerDirection::HighTriggers => value >= threshold,
        }
    }
}

impl std::fmt::Display for TriggerDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerDirection::LowTriggers => write!(f, "low_triggers"),
            TriggerDirection::HighTriggers => write!(f, "high_triggers"),
        }
    }
}

/// Predictor-value threshold for a frequency in (0, 100].
///
/// Computed as the linear-interpolation quantile at the severe tail
/// probability. Returns None for empty/NaN input or a frequency outside
/// (0, 100].
pub fn trigger_threshold(values: &[f64], frequency: f64, direction: TriggerDirection) -> Option<f64> {
    if !(frequency > 0.0 && frequency <= 100.0) {
        return None;
    }
    let sorted = sort_values(values);
    quantile_sorted(&sorted, direction.tail_probability(frequency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_threshold_rejects_bad_frequency() {
        let values = [0.1, 0.2, 0.3];
        assert_eq!(trigger_threshold(&values, 0.0, TriggerDirection::LowTriggers), None);
        assert_eq!(trigger_threshold(&values, -5.0, TriggerDirection::LowTriggers), None);
        assert_eq!(trigger_threshold(&values, 100.1, TriggerDirection::LowTriggers), None);
        assert_eq!(trigger_threshold(&values, f64::NAN, TriggerDirection::LowTriggers), None);
    }

    #[test]
    fn test_threshold_median_scenario() {
        // Frequency 50 with low-triggers: threshold is the interpolated median.
        let values = [0.30, 0.80, 0.10, 0.95];
        let threshold = trigger_threshold(&values, 50.0, TriggerDirection::LowTriggers).unwrap();
        assert!((threshold - 0.55).abs() < 1e-12);

        assert!(TriggerDirection::LowTriggers.triggers(0.30, threshold));
        assert!(TriggerDirection::LowTriggers.triggers(0.10, threshold));
        assert!(!TriggerDirection::LowTriggers.triggers(0.80, threshold));
        assert!(!TriggerDirection::LowTriggers.triggers(0.95, threshold));
    }

    #[test]
    fn test_threshold_high_direction_mirrors_low() {
        let values = [0.30, 0.80, 0.10, 0.95];
        let threshold = trigger_threshold(&values, 50.0, TriggerDirection::HighTriggers).unwrap();
        assert!((threshold - 0.55).abs() < 1e-12);

        assert!(TriggerDirection::HighTriggers.triggers(0.80, threshold));
        assert!(TriggerDirection::HighTriggers.triggers(0.95, threshold));
        assert!(!TriggerDirection::HighTriggers.triggers(0.30, threshold));
    }

    #[test]
    fn test_tie_at_threshold_triggers() {
        let values = [0.2, 0.2, 0.2, 0.9];
        let threshold = trigger_threshold(&values, 25.0, TriggerDirection::LowTriggers).unwrap();
        // All tied values sit at the threshold and trigger inclusively.
        assert!(TriggerDirection::LowTriggers.triggers(0.2, threshold));
    }

    #[test]
    fn test_frequency_100_triggers_everything() {
        let values = [0.1, 0.5, 0.9];
        let threshold = trigger_threshold(&values, 100.0, TriggerDirection::LowTriggers).unwrap();
        assert!(values.iter().all(|&v| TriggerDirection::LowTriggers.triggers(v, threshold)));
    }

    proptest! {
        #[test]
        fn triggered_count_non_decreasing_in_frequency(
            values in proptest::collection::vec(0.0f64..1.0, 2..48),
            f1 in 1.0f64..100.0,
            f2 in 1.0f64..100.0,
        ) {
            let (lo, hi) = if f1 <= f2 { (f1, f2) } else { (f2, f1) };
            for direction in [TriggerDirection::LowTriggers, TriggerDirection::HighTriggers] {
                let t_lo = trigger_threshold(&values, lo, direction).unwrap();
                let t_hi = trigger_threshold(&values, hi, direction).unwrap();
                let count_lo = values.iter().filter(|&&v| direction.triggers(v, t_lo)).count();
                let count_hi = values.iter().filter(|&&v| direction.triggers(v, t_hi)).count();
                prop_assert!(
                    count_lo <= count_hi,
                    "direction {:?}: count at f={} was {}, at f={} was {}",
                    direction, lo, count_lo, hi, count_hi
                );
            }
        }
    }
}
