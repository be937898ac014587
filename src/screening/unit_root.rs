// =============================================================================
// Approximate unit-root statistic (ADF-style screen)
// =============================================================================
//
// Regresses one-period differences on the previous level with no drift, no
// trend and no lagged difference terms:
//
//   stat = Σ(diff[i] * prev[i]) / Σ(prev[i]²)
//
// and maps the coefficient to an illustrative p-value through fixed cut-offs.
//
// HEURISTIC: the cut-offs are not derived from Dickey-Fuller critical values.
// They are kept verbatim so screening results stay comparable across
// deployments; treat the p-value as a coarse ranking proxy only.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Coefficient cut-offs and the p-value assigned below each, tightest first.
const P_VALUE_TABLE: [(f64, f64); 3] = [(-0.25, 0.01), (-0.15, 0.05), (-0.08, 0.10)];

/// p-value assigned when the coefficient clears no cut-off.
pub const FALLBACK_P_VALUE: f64 = 0.30;

/// Output of the approximate unit-root screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRootStat {
    pub stat: f64,
    pub p_value: f64,
}

/// Compute the approximate unit-root statistic over every consecutive pair.
///
/// A zero denominator (all previous levels zero) or fewer than two closes
/// yields `stat = 0.0`, which maps to [`FALLBACK_P_VALUE`].
pub fn approximate_unit_root(closes: &[f64]) -> UnitRootStat {
    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;

    for pair in closes.windows(2) {
        let prev = pair[0];
        let diff = pair[1] - prev;
        numerator += diff * prev;
        denominator += prev * prev;
    }

    let stat = if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    };
    let stat = if stat.is_finite() { stat } else { 0.0 };
    let p_value = p_value_for(stat);

    trace!(stat = format!("{:.5}", stat), p_value, "unit-root screen computed");

    UnitRootStat { stat, p_value }
}

/// Map a coefficient to its heuristic p-value.
pub fn p_value_for(stat: f64) -> f64 {
    P_VALUE_TABLE
        .iter()
        .find(|(cutoff, _)| stat < *cutoff)
        .map_or(FALLBACK_P_VALUE, |(_, p)| *p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_value_cutoffs_are_strict() {
        assert_eq!(p_value_for(-1.0), 0.01);
        assert_eq!(p_value_for(-0.2500001), 0.01);
        assert_eq!(p_value_for(-0.25), 0.05);
        assert_eq!(p_value_for(-0.16), 0.05);
        assert_eq!(p_value_for(-0.15), 0.10);
        assert_eq!(p_value_for(-0.09), 0.10);
        assert_eq!(p_value_for(-0.08), 0.30);
        assert_eq!(p_value_for(0.0), 0.30);
        assert_eq!(p_value_for(0.5), 0.30);
    }

    #[test]
    fn alternating_around_zero_is_strongly_stationary() {
        // diff * prev = -2 and prev² = 1 on every step.
        let closes: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = approximate_unit_root(&closes);
        assert_eq!(r.stat, -2.0);
        assert_eq!(r.p_value, 0.01);
    }

    #[test]
    fn price_levels_far_from_zero_read_weak() {
        // Oscillation around 100: the undemeaned regression barely moves.
        let closes: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 105.0 } else { 95.0 }).collect();
        let r = approximate_unit_root(&closes);
        assert!(r.stat < 0.0 && r.stat > -0.08, "stat = {}", r.stat);
        assert_eq!(r.p_value, FALLBACK_P_VALUE);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(approximate_unit_root(&[]).stat, 0.0);
        assert_eq!(approximate_unit_root(&[5.0]).stat, 0.0);
        let zeros = approximate_unit_root(&[0.0, 0.0, 0.0]);
        assert_eq!(zeros.stat, 0.0);
        assert_eq!(zeros.p_value, 0.30);
    }

    #[test]
    fn constant_series_has_zero_stat() {
        let r = approximate_unit_root(&[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(r.stat, 0.0);
        assert_eq!(r.p_value, 0.30);
    }
}
