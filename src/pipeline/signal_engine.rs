// =============================================================================
// SignalEngine — synchronous symbol → context map
// =============================================================================
//
// Single-threaded driver used for backtest replays: bars are applied in the
// order given.  Contexts exist only for watchlisted symbols; bars for any
// other symbol are ignored.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::EngineResult;
use crate::market_data::Bar;
use crate::runtime_config::EngineConfig;
use crate::types::SignalEvent;

use super::context::{log_bar_error, SymbolContext};

pub struct SignalEngine {
    config: EngineConfig,
    contexts: HashMap<String, SymbolContext>,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            contexts: HashMap::new(),
        }
    }

    /// Make `symbols` the watched set. New symbols start cold; removed
    /// symbols' state is discarded. Returns `(added, removed)`.
    pub fn sync_watchlist(&mut self, symbols: &[String]) -> (Vec<String>, Vec<String>) {
        let mut removed: Vec<String> = self
            .contexts
            .keys()
            .filter(|s| !symbols.contains(*s))
            .cloned()
            .collect();
        removed.sort();
        for symbol in &removed {
            self.contexts.remove(symbol);
        }

        let mut added = Vec::new();
        for symbol in symbols {
            if !self.contexts.contains_key(symbol) {
                self.contexts
                    .insert(symbol.clone(), SymbolContext::new(symbol.clone(), &self.config));
                added.push(symbol.clone());
            }
        }

        info!(added = ?added, removed = ?removed, watched = self.contexts.len(), "signal engine watchlist synced");
        (added, removed)
    }

    /// Route one bar to its symbol's context.
    ///
    /// Bars for unwatched symbols yield `Ok(None)`.
    pub fn on_bar(&mut self, bar: Bar) -> EngineResult<Option<SignalEvent>> {
        match self.contexts.get_mut(&bar.symbol) {
            Some(ctx) => ctx.on_bar(bar),
            None => {
                debug!(symbol = %bar.symbol, "bar for unwatched symbol ignored");
                Ok(None)
            }
        }
    }

    /// Apply `bars` in order, logging per-symbol errors, and collect events.
    pub fn replay(&mut self, bars: impl IntoIterator<Item = Bar>) -> Vec<SignalEvent> {
        let mut events = Vec::new();
        for bar in bars {
            match self.on_bar(bar) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => log_bar_error(&e),
            }
        }
        events
    }

    /// Cold-reset every watched symbol.
    pub fn reset_all(&mut self) {
        for ctx in self.contexts.values_mut() {
            ctx.reset();
        }
        info!(symbols = self.contexts.len(), "all symbol state reset");
    }

    pub fn context(&self, symbol: &str) -> Option<&SymbolContext> {
        self.contexts.get(symbol)
    }

    /// Watched symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.contexts.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}
