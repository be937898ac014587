// =============================================================================
// Shared types used across the reversion engine
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one screening pass for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningDecision {
    Admit,
    Reject,
}

impl Default for ScreeningDecision {
    fn default() -> Self {
        Self::Reject
    }
}

impl std::fmt::Display for ScreeningDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admit => write!(f, "ADMIT"),
            Self::Reject => write!(f, "REJECT"),
        }
    }
}

/// Where a price sits relative to the lower Bollinger band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandSide {
    Above,
    At,
    Below,
}

impl BandSide {
    /// Classify `price` against `band`.
    pub fn classify(price: f64, band: f64) -> Self {
        if price > band {
            Self::Above
        } else if price < band {
            Self::Below
        } else {
            Self::At
        }
    }

    /// `true` for `At` and `Below`: the price has reached the band.
    pub fn touches(self) -> bool {
        matches!(self, Self::At | Self::Below)
    }
}

impl std::fmt::Display for BandSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::At => write!(f, "at"),
            Self::Below => write!(f, "below"),
        }
    }
}

/// Debounce phase of the per-symbol signal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalPhase {
    /// No signal armed; a fresh lower-band cross may fire.
    Idle,
    /// A signal was emitted; waiting for price to recover above the middle band.
    Signaled,
}

impl Default for SignalPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for SignalPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Signaled => write!(f, "SIGNALED"),
        }
    }
}

/// Buy-in event emitted when the trend and band filters align.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub adx: f64,
    pub price: f64,
    pub lower_band: f64,
    pub reason: String,
    /// Strategy tag carried to downstream consumers.
    pub strategy: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_side_classification() {
        assert_eq!(BandSide::classify(101.0, 100.0), BandSide::Above);
        assert_eq!(BandSide::classify(100.0, 100.0), BandSide::At);
        assert_eq!(BandSide::classify(99.0, 100.0), BandSide::Below);
        assert!(BandSide::At.touches());
        assert!(BandSide::Below.touches());
        assert!(!BandSide::Above.touches());
    }

    #[test]
    fn defaults_are_conservative() {
        assert_eq!(ScreeningDecision::default(), ScreeningDecision::Reject);
        assert_eq!(SignalPhase::default(), SignalPhase::Idle);
    }

    #[test]
    fn signal_event_serialises_with_rfc3339_timestamp() {
        let event = SignalEvent {
            symbol: "AAPL".into(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            adx: 18.5,
            price: 99.0,
            lower_band: 99.5,
            reason: "test".into(),
            strategy: "mr_v1".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"symbol\":\"AAPL\""));
        assert!(json.contains("2023-11-14T22:13:20Z"));
    }
}
