// =============================================================================
// Screening Module
// =============================================================================
//
// Mean-reversion screening over a window of daily closes:
// - Hurst exponent (single-scale rescaled range)
// - Variance ratio (lag 2)
// - Approximate unit-root statistic with heuristic p-value
//
// All kernels are pure functions over a slice.

pub mod hurst;
pub mod screener;
pub mod stats;
pub mod unit_root;
pub mod variance_ratio;

pub use hurst::calculate_hurst_exponent;
pub use screener::{rank_admitted, screen, screen_universe, ScreeningResult};
pub use unit_root::{approximate_unit_root, UnitRootStat};
pub use variance_ratio::variance_ratio;
