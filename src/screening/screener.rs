// =============================================================================
// Screener — combine the three mean-reversion scores into a decision
// =============================================================================
//
// `screen` is a pure function of its input window: no hidden state, so any
// number of symbols may be screened in parallel without coordination.
// `screen_universe` does exactly that on the blocking pool and
// `rank_admitted` turns the results into the next watchlist.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::runtime_config::ScreeningPolicy;
use crate::types::ScreeningDecision;

use super::hurst::{calculate_hurst_exponent, NEUTRAL_HURST};
use super::unit_root::{approximate_unit_root, FALLBACK_P_VALUE};
use super::variance_ratio::variance_ratio;

/// Hard floor below which no statistic is defined.
const ABSOLUTE_MIN_OBSERVATIONS: usize = 2;

/// Result of one screening pass for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub symbol: String,
    /// Number of closes the statistics were computed over.
    pub observations: usize,
    pub hurst: f64,
    pub variance_ratio: f64,
    pub adf_stat: f64,
    pub p_value: f64,
    pub decision: ScreeningDecision,
}

impl ScreeningResult {
    /// Neutral reject used for short or unusable histories.
    fn neutral(symbol: &str, observations: usize) -> Self {
        Self {
            symbol: symbol.to_string(),
            observations,
            hurst: NEUTRAL_HURST,
            variance_ratio: 0.0,
            adf_stat: 0.0,
            p_value: FALLBACK_P_VALUE,
            decision: ScreeningDecision::Reject,
        }
    }

    pub fn is_admitted(&self) -> bool {
        self.decision == ScreeningDecision::Admit
    }
}

/// Screen one symbol's ordered closes against `policy`.
///
/// * Fewer than `policy.min_observations` closes (or fewer than two) yields
///   the neutral reject result: `H = 0.5, VR = 0, decision = Reject`.
/// * Any NaN or infinite close yields [`EngineError::DegenerateInput`].
pub fn screen(
    symbol: &str,
    closes: &[f64],
    policy: &ScreeningPolicy,
) -> EngineResult<ScreeningResult> {
    if let Some(idx) = closes.iter().position(|c| !c.is_finite()) {
        return Err(EngineError::DegenerateInput(format!(
            "{symbol}: non-finite close {} at index {idx}",
            closes[idx]
        )));
    }

    let required = policy.min_observations.max(ABSOLUTE_MIN_OBSERVATIONS);
    if closes.len() < required {
        let reason = EngineError::InsufficientData {
            required,
            available: closes.len(),
        };
        debug!(symbol, reason = %reason, "screening: neutral reject");
        return Ok(ScreeningResult::neutral(symbol, closes.len()));
    }

    let hurst = calculate_hurst_exponent(closes);
    let vr = variance_ratio(closes);
    let unit_root = approximate_unit_root(closes);

    let admit = hurst < policy.hurst_threshold
        && vr < policy.vr_threshold
        && unit_root.p_value <= policy.p_value_threshold;

    let result = ScreeningResult {
        symbol: symbol.to_string(),
        observations: closes.len(),
        hurst,
        variance_ratio: vr,
        adf_stat: unit_root.stat,
        p_value: unit_root.p_value,
        decision: if admit {
            ScreeningDecision::Admit
        } else {
            ScreeningDecision::Reject
        },
    };

    debug!(
        symbol,
        hurst = format!("{:.4}", result.hurst),
        vr = format!("{:.4}", result.variance_ratio),
        adf_stat = format!("{:.5}", result.adf_stat),
        p_value = result.p_value,
        decision = %result.decision,
        "screening result"
    );

    Ok(result)
}

/// Screen every `(symbol, closes)` pair, one blocking task per symbol.
///
/// Only the most recent `policy.history_length` closes of each history are
/// used. Degenerate input becomes a neutral reject with a warning; a panicked
/// task is logged and its symbol dropped from the cycle. Output is sorted by
/// symbol.
pub async fn screen_universe(
    histories: Vec<(String, Vec<f64>)>,
    policy: &ScreeningPolicy,
) -> Vec<ScreeningResult> {
    let mut tasks = JoinSet::new();

    for (symbol, mut closes) in histories {
        let policy = policy.clone();
        if policy.history_length > 0 && closes.len() > policy.history_length {
            closes.drain(..closes.len() - policy.history_length);
        }
        tasks.spawn_blocking(move || match screen(&symbol, &closes, &policy) {
            Ok(result) => result,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "screening rejected degenerate input");
                ScreeningResult::neutral(&symbol, closes.len())
            }
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!(error = %e, "screening task failed"),
        }
    }
    results.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let admitted = results.iter().filter(|r| r.is_admitted()).count();
    info!(screened = results.len(), admitted, "screening cycle complete");

    results
}

/// Symbols admitted this cycle, best first, capped at `max_watchlist`.
///
/// Ordered by ascending p-value, then ascending Hurst exponent, then symbol.
/// A `max_watchlist` of zero means no cap.
pub fn rank_admitted(results: &[ScreeningResult], max_watchlist: usize) -> Vec<String> {
    let mut admitted: Vec<&ScreeningResult> = results.iter().filter(|r| r.is_admitted()).collect();
    admitted.sort_by(|a, b| {
        a.p_value
            .partial_cmp(&b.p_value)
            .unwrap_or(Ordering::Equal)
            .then(a.hurst.partial_cmp(&b.hurst).unwrap_or(Ordering::Equal))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    if max_watchlist > 0 {
        admitted.truncate(max_watchlist);
    }
    admitted.into_iter().map(|r| r.symbol.clone()).collect()
}
