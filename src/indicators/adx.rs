// =============================================================================
// Average Directional Index (ADX) — incremental
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Per bar (once a previous bar exists):
//   1. upMove = high - prevHigh, downMove = prevLow - low.
//   2. +DM = upMove   if upMove > downMove and upMove > 0, else 0.
//      -DM = downMove if downMove > upMove and downMove > 0, else 0.
//   3. TR  = max(high - low, |high - prevClose|, |low - prevClose|).
//   4. Wilder's smoothing: s = s - s / period + value, for +DM, -DM and TR.
//      Accumulators start at zero, so the first `period` values sum up to
//      Wilder's seed.
//   5. +DI = 100 * s(+DM) / s(TR), -DI = 100 * s(-DM) / s(TR); both 0 when
//      s(TR) == 0.
//   6. DX  = 100 * |+DI - -DI| / (+DI + -DI); 0 when the sum is 0.
//   7. ADX = running mean of DX while warming up, then Wilder's recurrence
//      ADX = ADX + (DX - ADX) / period.
//
// ADX is undefined until `period` bars have been observed.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

/// Smallest period for which the pipeline produces a DX before ADX is due.
const MIN_PERIOD: usize = 2;

#[derive(Debug, Clone, Copy)]
struct PrevBar {
    high: f64,
    low: f64,
    close: f64,
}

/// Directional readings after one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxReading {
    pub plus_di: f64,
    pub minus_di: f64,
    pub dx: f64,
    /// `None` until `period` bars have been observed.
    pub adx: Option<f64>,
}

/// Per-symbol ADX accumulator state. One [`AdxState::update`] per bar.
#[derive(Debug, Clone)]
pub struct AdxState {
    period: usize,
    prev: Option<PrevBar>,
    smoothed_plus_dm: f64,
    smoothed_minus_dm: f64,
    smoothed_tr: f64,
    adx: f64,
    dx_count: usize,
    bars_seen: usize,
}

impl AdxState {
    /// Create a cold accumulator. Periods below 2 are raised to 2.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            prev: None,
            smoothed_plus_dm: 0.0,
            smoothed_minus_dm: 0.0,
            smoothed_tr: 0.0,
            adx: 0.0,
            dx_count: 0,
            bars_seen: 0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Current ADX, `None` while warming up.
    pub fn value(&self) -> Option<f64> {
        (self.bars_seen >= self.period && self.dx_count > 0).then_some(self.adx)
    }

    /// Fold one bar into the accumulators.
    pub fn update(&mut self, high: f64, low: f64, close: f64) -> AdxReading {
        self.bars_seen += 1;

        let Some(prev) = self.prev.replace(PrevBar { high, low, close }) else {
            return AdxReading {
                plus_di: 0.0,
                minus_di: 0.0,
                dx: 0.0,
                adx: None,
            };
        };

        let up_move = high - prev.high;
        let down_move = prev.low - low;

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        let tr = (high - low)
            .max((high - prev.close).abs())
            .max((low - prev.close).abs());

        let period_f = self.period as f64;
        self.smoothed_plus_dm = wilder(self.smoothed_plus_dm, plus_dm, period_f);
        self.smoothed_minus_dm = wilder(self.smoothed_minus_dm, minus_dm, period_f);
        self.smoothed_tr = wilder(self.smoothed_tr, tr, period_f);

        let (plus_di, minus_di) = if self.smoothed_tr > 0.0 {
            (
                100.0 * self.smoothed_plus_dm / self.smoothed_tr,
                100.0 * self.smoothed_minus_dm / self.smoothed_tr,
            )
        } else {
            // Flat market: no directional signal.
            (0.0, 0.0)
        };

        let dx = compute_dx(plus_di, minus_di);

        self.dx_count += 1;
        let weight = self.dx_count.min(self.period) as f64;
        self.adx += (dx - self.adx) / weight;

        AdxReading {
            plus_di,
            minus_di,
            dx,
            adx: self.value(),
        }
    }

    /// Return to the cold state.
    pub fn reset(&mut self) {
        *self = Self::new(self.period);
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn wilder(previous: f64, value: f64, period: f64) -> f64 {
    previous - previous / period + value
}

/// DX from the two directional indicators; 0 when both are 0.
fn compute_dx(plus_di: f64, minus_di: f64) -> f64 {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    let dx = (plus_di - minus_di).abs() / di_sum * 100.0;
    if dx.is_finite() {
        dx
    } else {
        0.0
    }
}
