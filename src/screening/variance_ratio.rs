// =============================================================================
// Variance Ratio (lag 2)
// =============================================================================
//
//   d1[i] = p[i] - p[i-1]        v1 = sample variance(d1)
//   d2[i] = p[i] - p[i-2]        v2 = sample variance(d2)
//   VR    = v2 / (2 * v1)
//
// For a random walk the variance of 2-period changes is twice the variance of
// 1-period changes, so VR ~ 1. VR < 1 favours mean reversion.

use tracing::trace;

use super::stats::{lagged_differences, sample_variance};

/// Aggregation lag of the ratio.
const LAG: usize = 2;

/// Compute the lag-2 variance ratio of `closes`.
///
/// Returns `0.0` when `v1` is zero or undefined. The degenerate denominator
/// is read as "no evidence", so the value is never used to admit on its own.
pub fn variance_ratio(closes: &[f64]) -> f64 {
    let d1 = lagged_differences(closes, 1);
    let d2 = lagged_differences(closes, LAG);

    let v1 = match sample_variance(&d1) {
        Some(v) if v > 0.0 && v.is_finite() => v,
        _ => {
            trace!(len = closes.len(), "VR: degenerate one-period variance");
            return 0.0;
        }
    };

    let Some(v2) = sample_variance(&d2) else {
        trace!(len = closes.len(), "VR: too few lag-2 differences");
        return 0.0;
    };

    let vr = v2 / (LAG as f64 * v1);
    if !vr.is_finite() {
        return 0.0;
    }

    trace!(vr = format!("{:.4}", vr), points = closes.len(), "variance ratio computed");
    vr
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudorandom_walk(len: usize, seed: u64) -> Vec<f64> {
        let mut v = Vec::with_capacity(len);
        let mut price = 100.0;
        let mut state = seed;
        for _ in 0..len {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            price += (state as f64 / u64::MAX as f64) - 0.5;
            v.push(price);
        }
        v
    }

    #[test]
    fn constant_series_is_zero() {
        assert_eq!(variance_ratio(&[10.0, 10.0, 10.0, 10.0]), 0.0);
        assert_eq!(variance_ratio(&vec![55.5; 252]), 0.0);
    }

    #[test]
    fn too_short_is_zero() {
        assert_eq!(variance_ratio(&[]), 0.0);
        assert_eq!(variance_ratio(&[1.0, 2.0]), 0.0);
        // Two d1 values but a single d2 value.
        assert_eq!(variance_ratio(&[1.0, 3.0, 2.0]), 0.0);
    }

    #[test]
    fn alternating_series_strongly_mean_reverting() {
        let closes: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 101.0 } else { 99.0 }).collect();
        // Every lag-2 change is zero.
        assert_eq!(variance_ratio(&closes), 0.0);
    }

    #[test]
    fn damped_oscillation_below_one() {
        let closes: Vec<f64> = (0..200)
            .map(|i| 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 } + 0.3 * (i as f64 * 0.1).sin())
            .collect();
        let vr = variance_ratio(&closes);
        assert!(vr < 0.5, "expected strongly mean-reverting VR, got {vr:.4}");
    }

    #[test]
    fn random_walk_near_one() {
        for seed in [42_u64, 1234, 99_991, 123_456_789, 987_654_321] {
            let vr = variance_ratio(&pseudorandom_walk(512, seed));
            assert!((0.8..=1.2).contains(&vr), "seed {seed}: VR = {vr:.4}");
        }
    }

    #[test]
    fn deterministic() {
        let closes = pseudorandom_walk(300, 5);
        assert_eq!(
            variance_ratio(&closes).to_bits(),
            variance_ratio(&closes).to_bits()
        );
    }
}
