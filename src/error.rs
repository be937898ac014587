// =============================================================================
// Engine error kinds
// =============================================================================
//
// Every variant is local to one symbol and recoverable: drivers log it and
// keep processing the remaining symbols.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Fewer observations than a computation needs.
    #[error("insufficient data: need {required} observations, have {available}")]
    InsufficientData { required: usize, available: usize },

    /// Input that cannot produce a defined numeric result (NaN, infinity).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Bar timestamp not strictly after the last accepted bar.
    #[error("out-of-order bar for {symbol}: {incoming} is not after {last}")]
    OutOfOrderInput {
        symbol: String,
        last: DateTime<Utc>,
        incoming: DateTime<Utc>,
    },

    /// Bar routed to another symbol's window.
    #[error("bar for {found} pushed into window of {expected}")]
    SymbolMismatch { expected: String, found: String },

    /// Indicator values consumed before warm-up completed.
    #[error("indicators for {symbol} not ready ({bars_seen} bars observed)")]
    NotReady { symbol: String, bars_seen: usize },
}

pub type EngineResult<T> = Result<T, EngineError>;
