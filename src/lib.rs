// =============================================================================
// Reversion Engine — library root
// =============================================================================
//
// Mean-reversion screening over daily closes plus a streaming ADX/Bollinger
// signal engine partitioned by symbol.  The `reversion-engine` binary is a
// thin replay runner over this API; backtests drive `SignalEngine` directly.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod pipeline;
pub mod runtime_config;
pub mod screening;
pub mod signals;
pub mod types;
pub mod watchlist;

pub use error::{EngineError, EngineResult};
pub use runtime_config::EngineConfig;
