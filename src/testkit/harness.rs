//! An engine wired to a manual clock and in-memory value sources.

use std::sync::Arc;

use crate::adapter::outbound::{InMemoryPoolBook, InMemoryPriceFeed, ManualClock};
use crate::application::{BuyOrder, EngineSettings, MarketEngine, TradeReceipt};
use crate::domain::{Amount, FeedId, Fixed, MarketConfig, MarketId, PoolId, Side, TraderId};
use crate::error::Result;

use super::domain::{observation, START};

/// Engine plus handles on everything it reads from.
pub struct TestHarness {
    pub engine: MarketEngine,
    pub clock: Arc<ManualClock>,
    pub feed: Arc<InMemoryPriceFeed>,
    pub pools: Arc<InMemoryPoolBook>,
}

impl TestHarness {
    /// Harness with default settings and a free price feed.
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::build(settings, 0)
    }

    /// Harness whose feed charges `per_update_fee` per submitted update.
    pub fn with_update_fee(per_update_fee: u128) -> Self {
        Self::build(EngineSettings::default(), per_update_fee)
    }

    fn build(settings: EngineSettings, per_update_fee: u128) -> Self {
        let clock = Arc::new(ManualClock::new(START));
        let feed = Arc::new(InMemoryPriceFeed::new(per_update_fee));
        let pools = Arc::new(InMemoryPoolBook::new());
        let engine = MarketEngine::new(settings, clock.clone(), feed.clone(), pools.clone());
        Self {
            engine,
            clock,
            feed,
            pools,
        }
    }

    pub fn now(&self) -> i64 {
        self.engine.now()
    }

    /// Create a market; panics on invalid configs.
    pub fn create(&mut self, config: MarketConfig) -> MarketId {
        self.engine
            .create_market(config)
            .expect("market should be created")
    }

    /// Buy paying exactly the quoted cost.
    pub fn buy_exact(
        &mut self,
        market_id: MarketId,
        trader: &TraderId,
        side: Side,
        shares: Fixed,
    ) -> Result<TradeReceipt> {
        let payment = self.engine.quote(market_id, side, shares)?.cost;
        self.buy(market_id, trader, side, shares, payment)
    }

    pub fn buy(
        &mut self,
        market_id: MarketId,
        trader: &TraderId,
        side: Side,
        shares: Fixed,
        payment: Amount,
    ) -> Result<TradeReceipt> {
        self.engine.buy(&BuyOrder {
            market_id,
            trader: trader.clone(),
            side,
            shares,
            payment,
        })
    }

    pub fn set_time(&self, now: i64) {
        self.clock.set(now);
    }

    /// Publish `price` on `feed_id`, timestamped now.
    pub fn publish(&self, feed_id: FeedId, price: i64) {
        self.feed.publish(feed_id, observation(price, self.now()));
    }

    pub fn set_liquidity(&self, pool: PoolId, liquidity: u128) {
        self.pools.set_liquidity(pool, liquidity);
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
