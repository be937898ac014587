// =============================================================================
// SymbolContext — all mutable state of one symbol
// =============================================================================
//
// Window, indicator accumulators and signal state for a single symbol live
// together and are only ever touched by one driver at a time, one bar at a
// time, so no locking is involved.

use tracing::{trace, warn};

use crate::error::{EngineError, EngineResult};
use crate::indicators::{IndicatorEngine, IndicatorSnapshot};
use crate::market_data::{Bar, PriceWindow};
use crate::runtime_config::EngineConfig;
use crate::signals::{SignalState, SignalStateMachine};
use crate::types::SignalEvent;

#[derive(Debug, Clone)]
pub struct SymbolContext {
    symbol: String,
    window: PriceWindow,
    indicators: IndicatorEngine,
    signals: SignalStateMachine,
    last_snapshot: Option<IndicatorSnapshot>,
}

impl SymbolContext {
    pub fn new(symbol: impl Into<String>, config: &EngineConfig) -> Self {
        let symbol = symbol.into();
        Self {
            window: PriceWindow::new(symbol.clone(), config.window_capacity),
            indicators: IndicatorEngine::new(&config.indicators),
            signals: SignalStateMachine::new(symbol.clone(), config.signal.clone()),
            symbol,
            last_snapshot: None,
        }
    }

    /// Run one bar through window, indicators and signal rule.
    ///
    /// Out-of-order or foreign bars are rejected before any state changes.
    /// Bars observed during warm-up return `Ok(None)`.
    pub fn on_bar(&mut self, bar: Bar) -> EngineResult<Option<SignalEvent>> {
        self.window.push(bar)?;
        let Some(bar) = self.window.last() else {
            return Ok(None);
        };

        let snapshot = self.indicators.update(bar);
        self.last_snapshot = Some(snapshot);

        if !snapshot.ready {
            trace!(
                symbol = %self.symbol,
                bars_seen = snapshot.bars_seen,
                warmup = self.indicators.warmup_bars(),
                "indicators warming up"
            );
            return Ok(None);
        }

        self.signals.evaluate(bar.timestamp, bar.close, &snapshot)
    }

    /// Cold reset: window, indicators and signal state all start over.
    pub fn reset(&mut self) {
        self.window.clear();
        self.indicators.reset();
        self.signals.reset();
        self.last_snapshot = None;
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn window(&self) -> &PriceWindow {
        &self.window
    }

    pub fn last_snapshot(&self) -> Option<&IndicatorSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn signal_state(&self) -> &SignalState {
        self.signals.state()
    }
}

/// Log a per-symbol processing error at the level its kind deserves.
pub fn log_bar_error(error: &EngineError) {
    match error {
        EngineError::NotReady { symbol, bars_seen } => {
            trace!(symbol = %symbol, bars_seen, "indicators not ready");
        }
        EngineError::OutOfOrderInput {
            symbol,
            last,
            incoming,
        } => {
            warn!(
                symbol = %symbol,
                last = %last,
                incoming = %incoming,
                "out-of-order bar dropped"
            );
        }
        other => warn!(error = %other, "bar dropped"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::DateTime;

    use crate::market_data::Bar;

    /// Five-minute bar at step `i` with a one-point high/low range.
    pub fn bar(symbol: &str, i: i64, close: f64) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000 + i * 300, 0).unwrap(),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: None,
        }
    }

    /// 30 bars chopping between 100 and 101, then two lower-band crosses with
    /// a recovery above the middle band in between (events at 30 and 36) and a
    /// suppressed re-cross at 33.
    pub fn two_signal_closes() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        closes.extend([96.0, 97.0, 100.0, 96.5, 101.5, 101.0, 96.0]);
        closes
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{bar, two_signal_closes};
    use super::*;
    use crate::types::SignalPhase;

    fn run(ctx: &mut SymbolContext, closes: &[f64]) -> Vec<(usize, SignalEvent)> {
        closes
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| {
                ctx.on_bar(bar("KO", i as i64, c))
                    .unwrap()
                    .map(|e| (i, e))
            })
            .collect()
    }

    #[test]
    fn end_to_end_debounce_and_rearm() {
        let mut ctx = SymbolContext::new("KO", &EngineConfig::default());
        let events = run(&mut ctx, &two_signal_closes());

        let at: Vec<usize> = events.iter().map(|(i, _)| *i).collect();
        assert_eq!(at, vec![30, 36]);
        for (_, e) in &events {
            assert!(e.adx < 25.0);
            assert!(e.price <= e.lower_band);
            assert_eq!(e.symbol, "KO");
        }
        assert_eq!(ctx.signal_state().phase, SignalPhase::Signaled);
    }

    #[test]
    fn no_signal_during_warmup() {
        let mut ctx = SymbolContext::new("KO", &EngineConfig::default());
        // A crash on bar 10 happens before either indicator is warm.
        let mut closes = vec![100.0; 10];
        closes.push(80.0);
        assert!(run(&mut ctx, &closes).is_empty());
        assert!(!ctx.last_snapshot().unwrap().ready);
    }

    #[test]
    fn out_of_order_bar_is_dropped_and_processing_continues() {
        let mut ctx = SymbolContext::new("KO", &EngineConfig::default());
        let closes = two_signal_closes();
        let mut emitted = 0;
        for (i, &c) in closes.iter().enumerate() {
            if i == 15 {
                // Replay of an earlier timestamp with a wild price.
                let err = ctx.on_bar(bar("KO", 3, 10.0)).unwrap_err();
                assert!(matches!(err, EngineError::OutOfOrderInput { .. }));
            }
            if ctx.on_bar(bar("KO", i as i64, c)).unwrap().is_some() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 2);
        assert_eq!(ctx.window().len(), closes.len());
    }

    #[test]
    fn window_is_bounded() {
        let mut config = EngineConfig::default();
        config.window_capacity = 25;
        let mut ctx = SymbolContext::new("KO", &config);
        run(&mut ctx, &two_signal_closes());
        assert_eq!(ctx.window().len(), 25);
    }

    #[test]
    fn reset_requires_rewarm() {
        let mut ctx = SymbolContext::new("KO", &EngineConfig::default());
        let closes = two_signal_closes();
        run(&mut ctx, &closes[..31]);
        ctx.reset();
        assert!(ctx.window().is_empty());
        assert!(ctx.last_snapshot().is_none());
        assert_eq!(ctx.signal_state().phase, SignalPhase::Idle);

        // Earlier timestamps are accepted again after the cold reset.
        let snapshot_ready = ctx
            .on_bar(bar("KO", 0, 100.0))
            .map(|_| ctx.last_snapshot().unwrap().ready)
            .unwrap();
        assert!(!snapshot_ready);
    }
}
