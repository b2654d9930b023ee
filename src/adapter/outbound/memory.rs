//! In-memory value sources for tests, scenario replays and local runs.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::domain::{FeedId, PoolId};
use crate::error::ValueSourceError;
use crate::port::{PoolReader, PriceFeed, PriceObservation, PriceUpdate};

/// Price feed keeping the newest observation per feed.
///
/// Updates are accepted as delivered; payload signatures are not checked.
#[derive(Debug, Default)]
pub struct InMemoryPriceFeed {
    per_update_fee: u128,
    prices: RwLock<HashMap<FeedId, PriceObservation>>,
}

impl InMemoryPriceFeed {
    #[must_use]
    pub fn new(per_update_fee: u128) -> Self {
        Self {
            per_update_fee,
            prices: RwLock::new(HashMap::new()),
        }
    }

    /// Store an observation directly, bypassing fees.
    ///
    /// Older observations than the stored one are ignored.
    pub fn publish(&self, feed_id: FeedId, observation: PriceObservation) {
        let mut prices = self.prices.write();
        store_newest(&mut prices, feed_id, observation);
    }
}

fn store_newest(
    prices: &mut HashMap<FeedId, PriceObservation>,
    feed_id: FeedId,
    observation: PriceObservation,
) {
    match prices.get(&feed_id) {
        Some(current) if current.publish_time > observation.publish_time => {
            debug!(feed_id = %feed_id, "Ignoring older price update");
        }
        _ => {
            prices.insert(feed_id, observation);
        }
    }
}

impl PriceFeed for InMemoryPriceFeed {
    fn latest_price(&self, feed_id: &FeedId) -> Result<PriceObservation, ValueSourceError> {
        self.prices
            .read()
            .get(feed_id)
            .copied()
            .ok_or(ValueSourceError::FeedNotFound(*feed_id))
    }

    fn update_fee(&self, updates: &[PriceUpdate]) -> u128 {
        self.per_update_fee.saturating_mul(updates.len() as u128)
    }

    fn submit_updates(
        &self,
        updates: &[PriceUpdate],
        fee: u128,
    ) -> Result<(), ValueSourceError> {
        let required = self.update_fee(updates);
        if fee < required {
            warn!(required, provided = fee, "Price update fee too low");
            return Err(ValueSourceError::InsufficientUpdateFee {
                required,
                provided: fee,
            });
        }
        if let Some(update) = updates.iter().find(|update| update.feed_id.is_zero()) {
            return Err(ValueSourceError::InvalidUpdate(format!(
                "zero feed id in update published at {}",
                update.observation.publish_time
            )));
        }

        let mut prices = self.prices.write();
        for update in updates {
            store_newest(&mut prices, update.feed_id, update.observation);
        }
        debug!(count = updates.len(), "Price updates stored");
        Ok(())
    }
}

/// Pool book with settable liquidity and simulated outages.
#[derive(Debug, Default)]
pub struct InMemoryPoolBook {
    liquidity: RwLock<HashMap<PoolId, u128>>,
    unavailable: RwLock<HashSet<PoolId>>,
}

impl InMemoryPoolBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_liquidity(&self, pool: PoolId, liquidity: u128) {
        self.liquidity.write().insert(pool, liquidity);
    }

    /// Make reads of `pool` fail (`true`) or succeed again (`false`).
    pub fn set_unavailable(&self, pool: PoolId, unavailable: bool) {
        let mut pools = self.unavailable.write();
        if unavailable {
            pools.insert(pool);
        } else {
            pools.remove(&pool);
        }
    }
}

impl PoolReader for InMemoryPoolBook {
    fn liquidity(&self, pool: &PoolId) -> Result<u128, ValueSourceError> {
        if self.unavailable.read().contains(pool) {
            return Err(ValueSourceError::PoolUnavailable {
                pool: *pool,
                reason: "pool query failed".into(),
            });
        }
        self.liquidity
            .read()
            .get(pool)
            .copied()
            .ok_or_else(|| ValueSourceError::PoolUnavailable {
                pool: *pool,
                reason: "unknown pool".into(),
            })
    }
}
