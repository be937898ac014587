// =============================================================================
// Watchlist — full-replacement reconciliation of screening output
// =============================================================================
//
// Each screening cycle REPLACES the watchlist: admitted symbols absent from
// the list are added, listed symbols no longer admitted are removed, and
// symbols admitted again keep their original `added_at`.  Membership is a set
// keyed by symbol, so replaying a cycle is idempotent.
// =============================================================================

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::screening::{rank_admitted, ScreeningResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One watchlisted symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub added_at: DateTime<Utc>,
}

/// Summary of a single reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub retained: Vec<String>,
}

impl WatchlistDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Store abstraction
// ---------------------------------------------------------------------------

/// Destination of screening decisions.
///
/// Implementations must apply `replace` atomically: readers observe either
/// the previous or the new membership, never a mix.
pub trait WatchlistStore: Send + Sync {
    /// Make `admitted` the complete membership as of `at`.
    fn replace(&self, admitted: &[String], at: DateTime<Utc>) -> WatchlistDiff;

    /// Current membership, sorted by symbol.
    fn entries(&self) -> Vec<WatchlistEntry>;

    fn contains(&self, symbol: &str) -> bool;

    /// Current symbols, sorted.
    fn symbols(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.symbol).collect()
    }
}

/// In-process watchlist guarded by a `parking_lot::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryWatchlist {
    entries: RwLock<BTreeMap<String, WatchlistEntry>>,
}

impl InMemoryWatchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl WatchlistStore for InMemoryWatchlist {
    fn replace(&self, admitted: &[String], at: DateTime<Utc>) -> WatchlistDiff {
        let next: BTreeSet<&str> = admitted.iter().map(String::as_str).collect();
        let mut map = self.entries.write();

        let mut diff = WatchlistDiff::default();

        map.retain(|symbol, _| {
            let keep = next.contains(symbol.as_str());
            if keep {
                diff.retained.push(symbol.clone());
            } else {
                diff.removed.push(symbol.clone());
            }
            keep
        });

        for symbol in next {
            if !map.contains_key(symbol) {
                map.insert(
                    symbol.to_string(),
                    WatchlistEntry {
                        symbol: symbol.to_string(),
                        added_at: at,
                    },
                );
                diff.added.push(symbol.to_string());
            }
        }

        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            retained = diff.retained.len(),
            "watchlist replaced"
        );

        diff
    }

    fn entries(&self) -> Vec<WatchlistEntry> {
        self.entries.read().values().cloned().collect()
    }

    fn contains(&self, symbol: &str) -> bool {
        self.entries.read().contains_key(symbol)
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Reconcile `store` with one screening cycle's results.
///
/// Admitted symbols are ranked and capped at `max_watchlist` before the
/// replacement.
pub fn apply_screening_cycle(
    store: &dyn WatchlistStore,
    results: &[ScreeningResult],
    max_watchlist: usize,
    at: DateTime<Utc>,
) -> WatchlistDiff {
    let admitted = rank_admitted(results, max_watchlist);
    let diff = store.replace(&admitted, at);

    info!(
        screened = results.len(),
        admitted = admitted.len(),
        added = ?diff.added,
        removed = ?diff.removed,
        "watchlist reconciled"
    );

    diff
}
