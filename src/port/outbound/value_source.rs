//! External value source ports.
//!
//! Markets settle against one of two kinds of source:
//!
//! - [`PriceFeed`] - a published reference price with a confidence band and
//!   publish time, refreshed by pushing signed updates
//! - [`PoolReader`] - a live liquidity reading, with no staleness notion

use serde::{Deserialize, Serialize};

use crate::domain::{FeedId, PoolId};
use crate::error::ValueSourceError;

/// A published reference price.
///
/// The real value is `price * 10^exponent`, with the same scaling for
/// `confidence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub price: i64,
    pub confidence: u64,
    pub exponent: i32,
    /// Unix seconds.
    pub publish_time: i64,
}

/// An externally supplied update for one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub feed_id: FeedId,
    pub observation: PriceObservation,
    /// Signed payload as delivered by the off-chain service.
    pub payload: Vec<u8>,
}

/// Port for reading and refreshing reference prices.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait PriceFeed: Send + Sync {
    /// Latest stored observation for a feed.
    ///
    /// # Errors
    ///
    /// Returns [`ValueSourceError::FeedNotFound`] if nothing was published.
    fn latest_price(&self, feed_id: &FeedId) -> Result<PriceObservation, ValueSourceError>;

    /// Fee required to submit `updates`.
    fn update_fee(&self, updates: &[PriceUpdate]) -> u128;

    /// Store fresh observations, paying `fee`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueSourceError::InsufficientUpdateFee`] when `fee` is below
    /// [`update_fee`](Self::update_fee), or [`ValueSourceError::InvalidUpdate`]
    /// for a malformed update. No update is stored on error.
    fn submit_updates(&self, updates: &[PriceUpdate], fee: u128)
        -> Result<(), ValueSourceError>;
}

/// Port for reading live pool liquidity.
pub trait PoolReader: Send + Sync {
    /// Current liquidity of `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueSourceError::PoolUnavailable`] if the pool cannot be read.
    fn liquidity(&self, pool: &PoolId) -> Result<u128, ValueSourceError>;
}
