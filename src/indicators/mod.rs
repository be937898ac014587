// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Incremental, per-symbol indicator state for the streaming path.  Values
// that are not yet warmed up are `None`, so callers are forced to handle the
// insufficient-data case instead of acting on placeholder zeros.

pub mod adx;
pub mod bollinger;
pub mod engine;

pub use engine::{IndicatorEngine, IndicatorSnapshot, ReadyIndicators};
