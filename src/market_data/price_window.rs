use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Absent on synthetic intraday feeds.
    #[serde(default)]
    pub volume: Option<f64>,
}

// ---------------------------------------------------------------------------
// PriceWindow -- per-symbol ring buffer
// ---------------------------------------------------------------------------

/// Fixed-capacity ring buffer of the most recent bars for one symbol.
///
/// Timestamps are strictly increasing. Once `capacity` is reached every push
/// evicts the oldest bar. The window is owned by a single symbol context and
/// is never shared, so it carries no lock.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    symbol: String,
    bars: VecDeque<Bar>,
    capacity: usize,
}

impl PriceWindow {
    /// Create an empty window for `symbol` retaining at most `capacity` bars.
    /// A zero capacity is raised to one.
    pub fn new(symbol: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            symbol: symbol.into(),
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `bar`, evicting the oldest bar when full.
    ///
    /// Fails with [`EngineError::OutOfOrderInput`] when the bar's timestamp is
    /// not strictly after the newest stored bar, and with
    /// [`EngineError::SymbolMismatch`] when it belongs to another symbol. A
    /// rejected bar leaves the window untouched.
    pub fn push(&mut self, bar: Bar) -> EngineResult<()> {
        if bar.symbol != self.symbol {
            return Err(EngineError::SymbolMismatch {
                expected: self.symbol.clone(),
                found: bar.symbol,
            });
        }

        if let Some(last) = self.bars.back() {
            if bar.timestamp <= last.timestamp {
                return Err(EngineError::OutOfOrderInput {
                    symbol: bar.symbol,
                    last: last.timestamp,
                    incoming: bar.timestamp,
                });
            }
        }

        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
        Ok(())
    }

    /// Ordered (oldest-first) read-only view of the current contents.
    pub fn snapshot(&self) -> impl ExactSizeIterator<Item = &Bar> + '_ {
        self.bars.iter()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Most recent bar, if any.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every stored bar (cold reset).
    pub fn clear(&mut self) {
        self.bars.clear();
    }
}
