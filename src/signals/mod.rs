// =============================================================================
// Signals Module
// =============================================================================
//
// Turns ready indicator snapshots into discrete buy-in events:
// - ADX trend filter (only while the market is ranging)
// - Lower Bollinger band cross detection
// - Debounce until price recovers above the middle band

pub mod state_machine;

pub use state_machine::{SignalState, SignalStateMachine};
