//! Linear-interpolation quantiles over order statistics.
//!
//! For probability `p` over `n` sorted values, the quantile sits at position
//! `p * (n - 1)` and interpolates linearly between the floor and ceil order
//! statistics. Quantile at 0 is the minimum, at 1 the maximum.

use serde::{Deserialize, Serialize};

/// Sort a slice of values ascending by total order.
///
/// The caller is responsible for excluding NaN upstream; `total_cmp` keeps
/// the sort deterministic even if one slips through.
pub fn sort_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile of pre-sorted values at probability `p` in [0, 1].
///
/// Returns None for empty input, NaN input, or `p` outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if sorted.iter().any(|v| v.is_nan()) {
        return None;
    }
    let position = p * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let weight = position - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Quantile of unsorted values at probability `p` in [0, 1].
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sort_values(values), p)
}

/// Five-number summary (min, quartiles, max) for box-plot rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Compute the five-number summary of a value set.
///
/// Returns None for empty or NaN-containing input.
pub fn five_number_summary(values: &[f64]) -> Option<FiveNumberSummary> {
    let sorted = sort_values(values);
    Some(FiveNumberSummary {
        min: quantile_sorted(&sorted, 0.0)?,
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max: quantile_sorted(&sorted, 1.0)?,
    })
}
