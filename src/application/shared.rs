//! Thread-safe handle to a [`MarketEngine`].

use std::sync::Arc;

use parking_lot::Mutex;

use super::engine::MarketEngine;
use super::ledger::{BuyOrder, Quote, TradeReceipt};
use super::resolution::ResolutionReport;
use crate::domain::{Amount, Fixed, MarketConfig, MarketId, Side, TraderId};
use crate::error::Result;

/// Cloneable handle serialising every call through one lock.
///
/// Each call holds the lock for its whole duration, so concurrent callers
/// observe a total order of fully committed calls.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<MarketEngine>>,
}

impl SharedEngine {
    #[must_use]
    pub fn new(engine: MarketEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn create_market(&self, config: MarketConfig) -> Result<MarketId> {
        self.inner.lock().create_market(config)
    }

    pub fn buy(&self, order: &BuyOrder) -> Result<TradeReceipt> {
        self.inner.lock().buy(order)
    }

    pub fn quote(&self, market_id: MarketId, side: Side, shares: Fixed) -> Result<Quote> {
        self.inner.lock().quote(market_id, side, shares)
    }

    pub fn resolve_market(&self, market_id: MarketId) -> Result<ResolutionReport> {
        self.inner.lock().resolve_market(market_id)
    }

    pub fn claim_payout(&self, market_id: MarketId, trader: &TraderId) -> Result<Amount> {
        self.inner.lock().claim_payout(market_id, trader)
    }

    /// Run a read-only closure against a consistent snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&MarketEngine) -> R) -> R {
        f(&self.inner.lock())
    }
}
