// =============================================================================
// Signal State Machine — dual-filter lower-band cross with debounce
// =============================================================================
//
//   IDLE ──(ADX < threshold AND price crosses down to/through lower)──► SIGNALED
//   SIGNALED ──(close > middle)──► IDLE
//
// A cross needs the previous ready observation to sit above its lower band
// and the current one at or below it; being below alone never fires.  While
// SIGNALED no further event is emitted however many crosses occur.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::indicators::{IndicatorSnapshot, ReadyIndicators};
use crate::runtime_config::SignalParams;
use crate::types::{BandSide, SignalEvent, SignalPhase};

/// Per-symbol debounce and cross-detection state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalState {
    pub phase: SignalPhase,
    pub last_signal_at: Option<DateTime<Utc>>,
    pub last_band_side: Option<BandSide>,
}

/// Signal rule for one symbol.
#[derive(Debug, Clone)]
pub struct SignalStateMachine {
    symbol: String,
    params: SignalParams,
    state: SignalState,
}

impl SignalStateMachine {
    pub fn new(symbol: impl Into<String>, params: SignalParams) -> Self {
        Self {
            symbol: symbol.into(),
            params,
            state: SignalState::default(),
        }
    }

    /// Evaluate one indicator snapshot at `price`.
    ///
    /// Returns [`EngineError::NotReady`] without touching the state when the
    /// snapshot is still warming up.
    pub fn evaluate(
        &mut self,
        timestamp: DateTime<Utc>,
        price: f64,
        snapshot: &IndicatorSnapshot,
    ) -> EngineResult<Option<SignalEvent>> {
        let values = snapshot.ready_values().ok_or_else(|| EngineError::NotReady {
            symbol: self.symbol.clone(),
            bars_seen: snapshot.bars_seen,
        })?;
        Ok(self.apply(timestamp, price, values))
    }

    /// Transition on ready indicator values.
    pub fn apply(
        &mut self,
        timestamp: DateTime<Utc>,
        price: f64,
        ind: ReadyIndicators,
    ) -> Option<SignalEvent> {
        let side = BandSide::classify(price, ind.lower);
        let crossed = side.touches() && self.state.last_band_side == Some(BandSide::Above);
        self.state.last_band_side = Some(side);

        match self.state.phase {
            SignalPhase::Signaled => {
                if price > ind.middle {
                    self.state.phase = SignalPhase::Idle;
                    debug!(
                        symbol = %self.symbol,
                        price,
                        middle = ind.middle,
                        "price recovered above middle band, signal re-armed"
                    );
                }
                None
            }
            SignalPhase::Idle => {
                let ranging = ind.adx < self.params.adx_threshold;
                if !(ranging && crossed) {
                    if crossed {
                        debug!(
                            symbol = %self.symbol,
                            adx = ind.adx,
                            threshold = self.params.adx_threshold,
                            "lower-band cross ignored: market trending"
                        );
                    }
                    return None;
                }

                self.state.phase = SignalPhase::Signaled;
                self.state.last_signal_at = Some(timestamp);

                let event = SignalEvent {
                    symbol: self.symbol.clone(),
                    timestamp,
                    adx: ind.adx,
                    price,
                    lower_band: ind.lower,
                    reason: format!(
                        "close {:.4} crossed lower band {:.4} with ADX {:.2} < {:.2}",
                        price, ind.lower, ind.adx, self.params.adx_threshold
                    ),
                    strategy: self.params.strategy.clone(),
                };

                info!(
                    symbol = %event.symbol,
                    price = event.price,
                    lower_band = event.lower_band,
                    adx = format!("{:.2}", event.adx),
                    "signal emitted"
                );

                Some(event)
            }
        }
    }

    pub fn state(&self) -> &SignalState {
        &self.state
    }

    pub fn phase(&self) -> SignalPhase {
        self.state.phase
    }

    /// Back to IDLE with no history.
    pub fn reset(&mut self) {
        self.state = SignalState::default();
    }
}
