// =============================================================================
// Pipeline Module
// =============================================================================
//
// Per-symbol processing: window -> indicators -> signal state machine.
// - `SymbolContext`: the complete state of one symbol
// - `SignalEngine`: synchronous driver (backtest replay)
// - `SymbolWorkerPool`: one tokio task per symbol (live / replay feed)

pub mod context;
pub mod signal_engine;
pub mod worker_pool;

pub use context::SymbolContext;
pub use signal_engine::SignalEngine;
pub use worker_pool::{SymbolCommand, SymbolWorkerPool};
