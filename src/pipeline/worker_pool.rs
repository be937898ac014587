// =============================================================================
// SymbolWorkerPool — one tokio task per watchlisted symbol
// =============================================================================
//
// Each worker exclusively owns its `SymbolContext` and drains a bounded
// command queue, so a symbol sees exactly one bar at a time and in arrival
// order, while different symbols progress in parallel.  A full queue makes
// `dispatch` wait, which propagates back-pressure to the feed.
//
// Removing a symbol aborts its worker; the state is dropped with the task.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::market_data::Bar;
use crate::runtime_config::EngineConfig;
use crate::types::SignalEvent;

use super::context::{log_bar_error, SymbolContext};

/// Message delivered to a symbol worker.
#[derive(Debug, Clone)]
pub enum SymbolCommand {
    Bar(Bar),
    /// Cold reset of the symbol's state.
    Reset,
}

struct WorkerHandle {
    tx: mpsc::Sender<SymbolCommand>,
    task: JoinHandle<()>,
}

pub struct SymbolWorkerPool {
    config: Arc<EngineConfig>,
    workers: HashMap<String, WorkerHandle>,
    events: mpsc::Sender<SignalEvent>,
}

impl SymbolWorkerPool {
    /// Build an empty pool publishing signal events on `events`.
    pub fn new(config: Arc<EngineConfig>, events: mpsc::Sender<SignalEvent>) -> Self {
        Self {
            config,
            workers: HashMap::new(),
            events,
        }
    }

    /// Make `symbols` the watched set: spawn workers for new symbols and tear
    /// down workers of symbols no longer listed. Returns `(added, removed)`.
    pub fn sync_watchlist(&mut self, symbols: &[String]) -> (Vec<String>, Vec<String>) {
        let mut removed: Vec<String> = self
            .workers
            .keys()
            .filter(|s| !symbols.contains(*s))
            .cloned()
            .collect();
        removed.sort();
        for symbol in &removed {
            if let Some(handle) = self.workers.remove(symbol) {
                handle.task.abort();
                debug!(symbol = %symbol, "symbol worker torn down");
            }
        }

        let mut added = Vec::new();
        for symbol in symbols {
            if self.workers.contains_key(symbol) {
                continue;
            }
            let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
            let ctx = SymbolContext::new(symbol.clone(), &self.config);
            let task = tokio::spawn(run_symbol_worker(ctx, rx, self.events.clone()));
            self.workers.insert(symbol.clone(), WorkerHandle { tx, task });
            added.push(symbol.clone());
        }

        info!(added = ?added, removed = ?removed, workers = self.workers.len(), "worker pool synced");
        (added, removed)
    }

    /// Queue `bar` for its symbol's worker.
    ///
    /// Returns `false` when the symbol is not watched or its worker is gone.
    pub async fn dispatch(&self, bar: Bar) -> bool {
        let Some(handle) = self.workers.get(&bar.symbol) else {
            debug!(symbol = %bar.symbol, "bar for unwatched symbol ignored");
            return false;
        };
        let symbol = bar.symbol.clone();
        if handle.tx.send(SymbolCommand::Bar(bar)).await.is_err() {
            warn!(symbol = %symbol, "symbol worker stopped, bar dropped");
            return false;
        }
        true
    }

    /// Queue a cold reset on every worker, behind any bars already queued.
    pub async fn reset_all(&self) {
        for (symbol, handle) in &self.workers {
            if handle.tx.send(SymbolCommand::Reset).await.is_err() {
                warn!(symbol = %symbol, "symbol worker stopped, reset skipped");
            }
        }
        info!(workers = self.workers.len(), "daily cold reset queued");
    }

    /// Watched symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.workers.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Close every queue and wait for workers to drain what they hold.
    pub async fn shutdown(self) {
        let handles: Vec<(String, JoinHandle<()>)> = self
            .workers
            .into_iter()
            .map(|(symbol, h)| {
                drop(h.tx);
                (symbol, h.task)
            })
            .collect();
        for (symbol, task) in handles {
            if let Err(e) = task.await {
                warn!(symbol = %symbol, error = %e, "symbol worker ended abnormally");
            }
        }
        info!("worker pool shut down");
    }
}

async fn run_symbol_worker(
    mut ctx: SymbolContext,
    mut rx: mpsc::Receiver<SymbolCommand>,
    events: mpsc::Sender<SignalEvent>,
) {
    debug!(symbol = %ctx.symbol(), "symbol worker started");
    while let Some(cmd) = rx.recv().await {
        match cmd {
            SymbolCommand::Bar(bar) => match ctx.on_bar(bar) {
                Ok(Some(event)) => {
                    if events.send(event).await.is_err() {
                        warn!(symbol = %ctx.symbol(), "signal sink closed, worker stopping");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => log_bar_error(&e),
            },
            SymbolCommand::Reset => ctx.reset(),
        }
    }
    debug!(symbol = %ctx.symbol(), "symbol worker stopped");
}
