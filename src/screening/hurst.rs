// =============================================================================
// Hurst Exponent — Single-scale Rescaled Range (R/S)
// =============================================================================
//
// The Hurst exponent H characterises the long-term memory of a time series:
//
//   H > 0.5  =>  trending / persistent
//   H ~ 0.5  =>  random walk
//   H < 0.5  =>  mean-reverting / anti-persistent
//
// Algorithm (whole window as a single scale):
//   1. mean of the closes.
//   2. cumulative deviation from the mean.
//   3. R = max(cumulative) - min(cumulative).
//   4. S = sample standard deviation of the closes.
//   5. H = ln(R / S) / ln(N), clamped to [0.0, 1.0].
//
// LIMITATION: the classical estimator regresses log(R/S) on log(n) across
// several chunk sizes. Using one scale makes this a screening heuristic, not
// a statistically rigorous estimator. Applied to price levels of a random
// walk it reads well above 0.5; applied to the walk's innovations it lands
// near 0.5.

use tracing::trace;

use super::stats::{mean, sample_variance};

/// Value returned when the series carries no information (flat or too short).
pub const NEUTRAL_HURST: f64 = 0.5;

/// Calculate the single-scale Hurst exponent of `closes`.
///
/// Returns [`NEUTRAL_HURST`] when the sample standard deviation is zero or
/// undefined (fewer than two points) and when the result is non-finite.
pub fn calculate_hurst_exponent(closes: &[f64]) -> f64 {
    let (Some(m), Some(variance)) = (mean(closes), sample_variance(closes)) else {
        trace!(len = closes.len(), "Hurst: insufficient data, neutral");
        return NEUTRAL_HURST;
    };

    let std_dev = variance.sqrt();
    if std_dev == 0.0 || !std_dev.is_finite() {
        trace!(len = closes.len(), "Hurst: zero dispersion, neutral");
        return NEUTRAL_HURST;
    }

    let mut running = 0.0_f64;
    let mut max_cum = f64::NEG_INFINITY;
    let mut min_cum = f64::INFINITY;
    for &val in closes {
        running += val - m;
        max_cum = max_cum.max(running);
        min_cum = min_cum.min(running);
    }
    let range = max_cum - min_cum;

    let raw = (range / std_dev).ln() / (closes.len() as f64).ln();
    if raw.is_nan() {
        trace!("Hurst: non-finite ratio, neutral");
        return NEUTRAL_HURST;
    }

    // ln(0) = -inf clamps to 0.0, which is the intended reading for R = 0.
    let hurst = raw.clamp(0.0, 1.0);

    trace!(
        hurst = format!("{:.4}", hurst),
        points = closes.len(),
        "Hurst exponent computed"
    );

    hurst
}
