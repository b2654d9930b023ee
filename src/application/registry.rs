//! Market registry: the arena of markets and their positions.
//!
//! Markets are stored in creation order and never removed, so a
//! [`MarketId`] is simply the arena index.

use std::collections::HashMap;

use tracing::info;

use crate::domain::{
    Market, MarketConfig, MarketId, MarketStatus, Position, TraderId, ValidationError,
};

/// A market together with every trader's position in it.
#[derive(Debug, Clone)]
pub struct MarketBook {
    pub(crate) market: Market,
    pub(crate) positions: HashMap<TraderId, Position>,
}

impl MarketBook {
    #[must_use]
    pub const fn market(&self) -> &Market {
        &self.market
    }

    #[must_use]
    pub fn position(&self, trader: &TraderId) -> Option<&Position> {
        self.positions.get(trader)
    }

    /// Iterate positions in no particular order.
    pub fn positions(&self) -> impl Iterator<Item = (&TraderId, &Position)> {
        self.positions.iter()
    }

    /// Number of traders holding a position.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.positions.len()
    }
}

/// Arena of all markets ever created.
#[derive(Debug, Default)]
pub struct MarketRegistry {
    books: Vec<MarketBook>,
}

impl MarketRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self { books: Vec::new() }
    }

    /// Validate `config` and store a new market.
    ///
    /// # Errors
    ///
    /// Returns the first violated creation invariant.
    pub fn create(
        &mut self,
        config: MarketConfig,
        fee_bps: u32,
        now: i64,
    ) -> Result<MarketId, ValidationError> {
        config.validate(now)?;

        let id = MarketId::new(self.books.len() as u64);
        let market = Market::open(id, config, fee_bps, now);
        info!(
            market_id = %id,
            deadline = market.deadline(),
            liquidity = %market.liquidity(),
            fee_bps,
            "Market created"
        );
        self.books.push(MarketBook {
            market,
            positions: HashMap::new(),
        });
        Ok(id)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.books.len() as u64
    }

    #[must_use]
    pub fn contains(&self, id: MarketId) -> bool {
        self.lookup(id).is_some()
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MarketNotFound`] for an unknown id.
    pub fn get(&self, id: MarketId) -> Result<&Market, ValidationError> {
        self.book(id).map(MarketBook::market)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MarketNotFound`] for an unknown id.
    pub fn book(&self, id: MarketId) -> Result<&MarketBook, ValidationError> {
        self.lookup(id).ok_or(ValidationError::MarketNotFound(id))
    }

    pub(crate) fn book_mut(&mut self, id: MarketId) -> Result<&mut MarketBook, ValidationError> {
        id.index()
            .and_then(|index| self.books.get_mut(index))
            .ok_or(ValidationError::MarketNotFound(id))
    }

    /// All markets in creation order.
    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.books.iter().map(MarketBook::market)
    }

    /// Markets accepting trades at `now`.
    #[must_use]
    pub fn active(&self, now: i64) -> Vec<MarketId> {
        self.with_status(now, MarketStatus::Open)
    }

    /// Markets past their deadline and waiting for resolution.
    #[must_use]
    pub fn expired_unresolved(&self, now: i64) -> Vec<MarketId> {
        self.with_status(now, MarketStatus::Expired)
    }

    #[must_use]
    pub fn resolved(&self) -> Vec<MarketId> {
        self.markets()
            .filter(|market| market.is_resolved())
            .map(Market::id)
            .collect()
    }

    fn with_status(&self, now: i64, status: MarketStatus) -> Vec<MarketId> {
        self.markets()
            .filter(|market| market.status(now) == status)
            .map(Market::id)
            .collect()
    }

    fn lookup(&self, id: MarketId) -> Option<&MarketBook> {
        id.index().and_then(|index| self.books.get(index))
    }
}
