//! Builders for domain primitives used across tests.

use alloy_primitives::{Address, B256};

use crate::domain::{
    Amount, FeedId, Fixed, MarketConfig, PoolId, ResolutionTarget, TraderId,
};
use crate::port::PriceObservation;

/// One whole token in base units.
pub const TOKEN: Amount = 1_000_000_000_000_000_000;

/// Start of every harness clock.
pub const START: i64 = 1_700_000_000;

/// Default market lifetime.
pub const ONE_DAY: i64 = 86_400;

/// Feed id filled with `byte`.
pub fn feed(byte: u8) -> FeedId {
    FeedId::new(B256::repeat_byte(byte))
}

/// Pool address filled with `byte`.
pub fn pool(byte: u8) -> PoolId {
    PoolId::new(Address::repeat_byte(byte))
}

pub fn trader(name: &str) -> TraderId {
    TraderId::from(name)
}

/// Whole number of shares or liquidity.
pub fn units(n: i64) -> Fixed {
    Fixed::from_int(n)
}

/// `n` whole tokens in base units.
pub fn tokens(n: u128) -> Amount {
    n * TOKEN
}

/// Market settled on `feed` against `target_price`, closing at `deadline`.
pub fn price_market(feed_id: FeedId, target_price: i64, deadline: i64, b: i64) -> MarketConfig {
    MarketConfig {
        description: format!("Feed {feed_id} at or above {target_price}"),
        deadline,
        liquidity: Fixed::from_int(b),
        target: ResolutionTarget::ReferencePrice {
            feed_id,
            target_price,
        },
        creator: trader("maker"),
    }
}

/// Market settled on `pool` liquidity against `target_liquidity`.
pub fn pool_market(pool: PoolId, target_liquidity: u128, deadline: i64, b: i64) -> MarketConfig {
    MarketConfig {
        description: format!("Pool {pool} holds at least {target_liquidity}"),
        deadline,
        liquidity: Fixed::from_int(b),
        target: ResolutionTarget::PoolLiquidity {
            pool,
            target_liquidity,
        },
        creator: trader("maker"),
    }
}

/// Observation with unit exponent and a tight confidence interval.
pub fn observation(price: i64, publish_time: i64) -> PriceObservation {
    PriceObservation {
        price,
        confidence: 1,
        exponent: 0,
        publish_time,
    }
}
