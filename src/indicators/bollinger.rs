// =============================================================================
// Bollinger Bands — incremental
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), with σ the sample standard deviation of the
// trailing window.
//
// Moments are taken over the stored closes shifted by the oldest close, so a
// flat window yields exactly zero dispersion and bands equal to the close.
// Work per bar is bounded by the window length.

use std::collections::VecDeque;

/// Band values for the current window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Sample standard deviation of the window.
    pub std_dev: f64,
    /// (last close - middle) / population σ; 0 when the window is flat.
    pub z_score: f64,
}

/// Per-symbol trailing window of closes.
#[derive(Debug, Clone)]
pub struct BollingerState {
    window: usize,
    num_std: f64,
    closes: VecDeque<f64>,
}

impl BollingerState {
    /// Create an empty window of `window` closes (at least 2) and width `num_std`.
    pub fn new(window: usize, num_std: f64) -> Self {
        let window = window.max(2);
        Self {
            window,
            num_std,
            closes: VecDeque::with_capacity(window + 1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Push `close` and return the bands once the window is full.
    pub fn update(&mut self, close: f64) -> Option<BollingerBands> {
        self.closes.push_back(close);
        if self.closes.len() > self.window {
            self.closes.pop_front();
        }
        self.bands()
    }

    /// Bands for the current contents, `None` until the window is full.
    pub fn bands(&self) -> Option<BollingerBands> {
        if self.closes.len() < self.window {
            return None;
        }
        let anchor = *self.closes.front()?;
        let last = *self.closes.back()?;

        let n = self.window as f64;
        let (sum_d, sum_d2) = self.closes.iter().fold((0.0, 0.0), |(s, s2), c| {
            let d = c - anchor;
            (s + d, s2 + d * d)
        });
        let middle = anchor + sum_d / n;
        // Clamp tiny negatives from cancellation.
        let centered = (sum_d2 - sum_d * sum_d / n).max(0.0);
        let std_dev = (centered / (n - 1.0)).sqrt();
        let pop_std = (centered / n).sqrt();

        let upper = middle + self.num_std * std_dev;
        let lower = middle - self.num_std * std_dev;
        let z_score = if pop_std > 0.0 {
            (last - middle) / pop_std
        } else {
            0.0
        };

        if !(upper.is_finite() && lower.is_finite()) {
            return None;
        }

        Some(BollingerBands {
            upper,
            middle,
            lower,
            std_dev,
            z_score,
        })
    }

    /// Return to the cold state.
    pub fn reset(&mut self) {
        self.closes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct two-pass computation for comparison.
    fn reference(window: &[f64], k: f64) -> (f64, f64, f64) {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let var = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let sd = var.sqrt();
        (mean + k * sd, mean, mean - k * sd)
    }

    #[test]
    fn bollinger_flat_window_collapses() {
        let mut bb = BollingerState::new(20, 2.0);
        let mut last = None;
        for _ in 0..20 {
            last = bb.update(100.0);
        }
        let b = last.unwrap();
        assert_eq!(b.middle, 100.0);
        assert_eq!(b.upper, 100.0);
        assert_eq!(b.lower, 100.0);
        assert_eq!(b.std_dev, 0.0);
        assert_eq!(b.z_score, 0.0);
    }

    #[test]
    fn flat_window_of_inexact_closes_collapses() {
        for price in [100.1, 61.37, 1234.567, 33.33] {
            let mut bb = BollingerState::new(20, 2.0);
            let mut last = None;
            for _ in 0..25 {
                last = bb.update(price);
            }
            let b = last.unwrap();
            assert_eq!(b.middle, price, "middle for {price}");
            assert_eq!(b.upper, price, "upper for {price}");
            assert_eq!(b.lower, price, "lower for {price}");
            assert_eq!(b.std_dev, 0.0);
            assert_eq!(b.z_score, 0.0);
        }
    }

    #[test]
    fn bollinger_undefined_until_exactly_window() {
        let mut bb = BollingerState::new(20, 2.0);
        for i in 1..=25 {
            let out = bb.update(i as f64);
            if i < 20 {
                assert!(out.is_none(), "close {i} should not be ready");
            } else {
                assert!(out.is_some(), "close {i} should be ready");
            }
        }
    }

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let mut bb = BollingerState::new(20, 2.0);
        let b = closes.iter().map(|&c| bb.update(c)).last().flatten().unwrap();
        let (upper, middle, lower) = reference(&closes, 2.0);
        assert!((b.middle - middle).abs() < 1e-9);
        assert!((b.upper - upper).abs() < 1e-9);
        assert!((b.lower - lower).abs() < 1e-9);
        assert!((b.std_dev - 35.0_f64.sqrt()).abs() < 1e-9);
        assert!(b.upper > b.middle && b.lower < b.middle);
        assert!(b.z_score > 0.0);
    }

    #[test]
    fn sliding_window_matches_direct_computation() {
        let closes: Vec<f64> = (0..500)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0 + (i as f64 * 0.05).cos())
            .collect();
        let mut bb = BollingerState::new(20, 2.0);
        for (i, &c) in closes.iter().enumerate() {
            let out = bb.update(c);
            if i + 1 >= 20 {
                let b = out.unwrap();
                let (upper, middle, lower) = reference(&closes[i + 1 - 20..=i], 2.0);
                assert!((b.middle - middle).abs() < 1e-8, "middle drift at {i}");
                assert!((b.upper - upper).abs() < 1e-6, "upper drift at {i}");
                assert!((b.lower - lower).abs() < 1e-6, "lower drift at {i}");
            }
        }
        assert_eq!(bb.len(), 20);
    }

    #[test]
    fn reset_clears_window() {
        let mut bb = BollingerState::new(3, 2.0);
        for c in [1.0, 2.0, 3.0] {
            bb.update(c);
        }
        assert!(bb.bands().is_some());
        bb.reset();
        assert_eq!(bb.len(), 0);
        assert!(bb.bands().is_none());
        assert!(bb.update(5.0).is_none());
    }
}
