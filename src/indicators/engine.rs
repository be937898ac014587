// =============================================================================
// Indicator Engine — per-symbol ADX + Bollinger state
// =============================================================================
//
// One `update` per incoming bar. The engine never suspends and does bounded
// work per bar, so it can run inline inside a symbol's worker task.

use serde::Serialize;

use crate::market_data::Bar;
use crate::runtime_config::IndicatorParams;

use super::adx::AdxState;
use super::bollinger::BollingerState;

/// Indicator values after one bar.
///
/// Every value is `None` until its own warm-up completes; `ready` is `true`
/// only when ADX and the bands are both defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub adx: Option<f64>,
    pub plus_di: f64,
    pub minus_di: f64,
    pub middle: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
    pub z_score: Option<f64>,
    pub bars_seen: usize,
    pub ready: bool,
}

/// The subset of a snapshot the signal rule acts on, only obtainable once ready.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadyIndicators {
    pub adx: f64,
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

impl IndicatorSnapshot {
    /// `Some` only when the snapshot is ready.
    pub fn ready_values(&self) -> Option<ReadyIndicators> {
        if !self.ready {
            return None;
        }
        Some(ReadyIndicators {
            adx: self.adx?,
            middle: self.middle?,
            upper: self.upper?,
            lower: self.lower?,
        })
    }
}

/// Incremental indicator state for one symbol.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    adx: AdxState,
    bands: BollingerState,
    bars_seen: usize,
}

impl IndicatorEngine {
    pub fn new(params: &IndicatorParams) -> Self {
        Self {
            adx: AdxState::new(params.adx_period),
            bands: BollingerState::new(params.bb_window, params.bb_k),
            bars_seen: 0,
        }
    }

    /// Fold `bar` into the state and return the resulting snapshot.
    pub fn update(&mut self, bar: &Bar) -> IndicatorSnapshot {
        self.bars_seen += 1;

        let reading = self.adx.update(bar.high, bar.low, bar.close);
        let bands = self.bands.update(bar.close);

        IndicatorSnapshot {
            adx: reading.adx,
            plus_di: reading.plus_di,
            minus_di: reading.minus_di,
            middle: bands.map(|b| b.middle),
            upper: bands.map(|b| b.upper),
            lower: bands.map(|b| b.lower),
            z_score: bands.map(|b| b.z_score),
            bars_seen: self.bars_seen,
            ready: reading.adx.is_some() && bands.is_some(),
        }
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Bars needed from a cold start before snapshots become ready.
    pub fn warmup_bars(&self) -> usize {
        self.adx.period().max(self.bands.window())
    }

    /// Cold reset: forget every bar.
    pub fn reset(&mut self) {
        self.adx.reset();
        self.bands.reset();
        self.bars_seen = 0;
    }
}
