//! The market engine facade.
//!
//! [`MarketEngine`] owns the registry, ledger, resolver and payout
//! calculator and is the single entry point for every mutation. It is a
//! plain sequential state machine: each `&mut self` call either commits
//! completely or returns an error with nothing changed. Wrap it in
//! [`SharedEngine`](super::shared::SharedEngine) to call it from several
//! threads.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::ledger::{BuyOrder, Quote, TradeLedger, TradeReceipt};
use super::payout::PayoutCalculator;
use super::registry::{MarketBook, MarketRegistry};
use super::resolution::{ResolutionCache, ResolutionEngine, ResolutionPolicy, ResolutionReport};
use crate::domain::{
    lmsr, Amount, Fixed, LifecycleError, Market, MarketConfig, MarketId, Outcome, Position,
    Side, TraderId, ValidationError, DEFAULT_FEE_BPS,
};
use crate::error::Result;
use crate::port::{Clock, PoolReader, PriceFeed, PriceUpdate};

/// Engine-wide settings, fixed for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineSettings {
    /// Platform fee in basis points, snapshotted into each new market.
    pub fee_bps: u32,
    pub resolution: ResolutionPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
            resolution: ResolutionPolicy::default(),
        }
    }
}

/// Resolution state as seen by pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResolutionStatus {
    pub resolved: bool,
    pub yes_wins: bool,
    pub outcome: Option<Outcome>,
}

/// Binary LMSR market engine.
pub struct MarketEngine {
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
    registry: MarketRegistry,
    ledger: TradeLedger,
    resolver: ResolutionEngine,
    payouts: PayoutCalculator,
}

impl MarketEngine {
    pub fn new(
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
        price_feed: Arc<dyn PriceFeed>,
        pools: Arc<dyn PoolReader>,
    ) -> Self {
        Self {
            settings,
            clock,
            registry: MarketRegistry::new(),
            ledger: TradeLedger::new(),
            resolver: ResolutionEngine::new(settings.resolution, price_feed, pools),
            payouts: PayoutCalculator::new(settings.resolution.empty_winning_side),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Current time according to the engine's clock.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a market and return its id.
    ///
    /// # Errors
    ///
    /// Fails with a [`ValidationError`] if the deadline is not in the future,
    /// `b <= 0`, the description is blank or the target is malformed.
    pub fn create_market(&mut self, config: MarketConfig) -> Result<MarketId> {
        let now = self.now();
        Ok(self.registry.create(config, self.settings.fee_bps, now)?)
    }

    /// Buy shares. See [`TradeLedger::buy`].
    ///
    /// # Errors
    ///
    /// Fails without state change on any validation, lifecycle or math error.
    pub fn buy(&mut self, order: &BuyOrder) -> Result<TradeReceipt> {
        let now = self.now();
        self.ledger.buy(&mut self.registry, order, now)
    }

    /// Resolve an expired market. See [`ResolutionEngine::resolve`].
    ///
    /// # Errors
    ///
    /// Fails without state change if the market is unknown, already resolved,
    /// not yet expired, or its value source has no usable value.
    pub fn resolve_market(&mut self, market_id: MarketId) -> Result<ResolutionReport> {
        let now = self.now();
        self.resolver.resolve(&mut self.registry, market_id, now)
    }

    /// Claim a trader's payout once.
    ///
    /// Marks the position claimed and books the amount against the market's
    /// escrow. Moving the funds is left to the wallet layer.
    ///
    /// # Errors
    ///
    /// - `MarketNotFound`, `NoPosition`
    /// - `NotResolved`, `AlreadyClaimed`
    pub fn claim_payout(&mut self, market_id: MarketId, trader: &TraderId) -> Result<Amount> {
        let winning_total = self.resolver.cache().winning_shares(market_id);
        let book = self.registry.book_mut(market_id)?;
        if !book.market.is_resolved() {
            return Err(LifecycleError::NotResolved(market_id).into());
        }

        let position = book
            .positions
            .get(trader)
            .ok_or_else(|| ValidationError::NoPosition {
                market_id,
                trader: trader.clone(),
            })?;
        if position.is_claimed() {
            warn!(market_id = %market_id, trader = %trader, "Payout already claimed");
            return Err(LifecycleError::AlreadyClaimed {
                market_id,
                trader: trader.clone(),
            }
            .into());
        }
        let amount = self.payouts.payout(&book.market, position, winning_total)?;

        book.market.record_payout(amount)?;
        if let Some(position) = book.positions.get_mut(trader) {
            position.mark_claimed();
        }

        info!(market_id = %market_id, trader = %trader, amount, "Payout claimed");
        Ok(amount)
    }

    /// Forward signed price updates to the price feed.
    ///
    /// # Errors
    ///
    /// Propagates the feed's rejection, with nothing stored.
    pub fn submit_price_updates(&self, updates: &[PriceUpdate], fee: u128) -> Result<()> {
        self.resolver.price_feed().submit_updates(updates, fee)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Price a buy without executing it.
    ///
    /// # Errors
    ///
    /// Same validation and lifecycle errors as [`buy`](Self::buy).
    pub fn quote(&self, market_id: MarketId, side: Side, shares: Fixed) -> Result<Quote> {
        self.ledger
            .quote(&self.registry, market_id, side, shares, self.now())
    }

    #[must_use]
    pub fn market_count(&self) -> u64 {
        self.registry.count()
    }

    /// # Errors
    ///
    /// Returns `MarketNotFound` for an unknown id.
    pub fn market(&self, market_id: MarketId) -> Result<&Market> {
        Ok(self.registry.get(market_id)?)
    }

    /// All markets in creation order.
    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.registry.markets()
    }

    /// # Errors
    ///
    /// Returns `MarketNotFound` for an unknown id.
    pub fn book(&self, market_id: MarketId) -> Result<&MarketBook> {
        Ok(self.registry.book(market_id)?)
    }

    #[must_use]
    pub fn active_markets(&self) -> Vec<MarketId> {
        self.registry.active(self.now())
    }

    #[must_use]
    pub fn expired_unresolved_markets(&self) -> Vec<MarketId> {
        self.registry.expired_unresolved(self.now())
    }

    #[must_use]
    pub fn resolved_markets(&self) -> Vec<MarketId> {
        self.registry.resolved()
    }

    /// Resolution state; unresolved for an unknown id.
    #[must_use]
    pub fn resolution_status(&self, market_id: MarketId) -> ResolutionStatus {
        let outcome = self.registry.get(market_id).ok().and_then(Market::outcome);
        ResolutionStatus {
            resolved: outcome.is_some(),
            yes_wins: outcome.is_some_and(Outcome::yes_wins),
            outcome,
        }
    }

    /// Escrow net of fees; zero for an unknown id.
    #[must_use]
    pub fn market_balance(&self, market_id: MarketId) -> Amount {
        self.registry
            .get(market_id)
            .map_or(0, Market::balance_net)
    }

    /// Fees accrued by one market; zero for an unknown id.
    #[must_use]
    pub fn platform_fees(&self, market_id: MarketId) -> Amount {
        self.registry
            .get(market_id)
            .map_or(0, Market::fees_accrued)
    }

    #[must_use]
    pub const fn total_platform_fees(&self) -> Amount {
        self.ledger.total_fees()
    }

    /// Traders holding a position in one market; zero for an unknown id.
    #[must_use]
    pub fn participant_count(&self, market_id: MarketId) -> usize {
        self.registry
            .book(market_id)
            .map_or(0, MarketBook::participant_count)
    }

    /// Distinct traders across all markets.
    #[must_use]
    pub fn total_participants(&self) -> usize {
        self.ledger.trader_count()
    }

    #[must_use]
    pub fn position(&self, market_id: MarketId, trader: &TraderId) -> Option<&Position> {
        self.registry
            .book(market_id)
            .ok()
            .and_then(|book| book.position(trader))
    }

    /// Amount owed to a trader, claimed or not.
    ///
    /// Zero before resolution, for unknown markets and for traders without
    /// a position.
    #[must_use]
    pub fn payout(&self, market_id: MarketId, trader: &TraderId) -> Amount {
        let Ok(book) = self.registry.book(market_id) else {
            return 0;
        };
        let Some(position) = book.position(trader) else {
            return 0;
        };
        self.payouts
            .payout(
                book.market(),
                position,
                self.resolver.cache().winning_shares(market_id),
            )
            .unwrap_or(0)
    }

    /// Cached winning-side total; zero before resolution or for an unknown id.
    #[must_use]
    pub fn winning_shares(&self, market_id: MarketId) -> Fixed {
        self.resolver.cache().winning_shares(market_id)
    }

    #[must_use]
    pub const fn resolution_cache(&self) -> &ResolutionCache {
        self.resolver.cache()
    }

    /// Current `(yes, no)` prices.
    ///
    /// # Errors
    ///
    /// Returns `MarketNotFound` for an unknown id.
    pub fn prices(&self, market_id: MarketId) -> Result<(Fixed, Fixed)> {
        let market = self.registry.get(market_id)?;
        Ok(lmsr::prices(market.q_yes(), market.q_no(), market.liquidity())?)
    }
}
