//! Market resolution: Expired to Resolved, exactly once.
//!
//! Resolution reads the external value for the market's target, decides the
//! outcome, and records the winning-side share total in the
//! [`ResolutionCache`] so payouts never need to scan participants.
//!
//! Two behaviours are configuration rather than fixed rules:
//!
//! - [`TieBreak`] - who wins when the observation equals the target
//! - [`StaleValuePolicy`] - what happens when no usable value exists

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::registry::MarketRegistry;
use crate::domain::money::BPS_DENOMINATOR;
use crate::domain::{
    Fixed, LifecycleError, Market, MarketId, ObservedValue, Outcome, Resolution,
    ResolutionTarget,
};
use crate::error::{Result, ValueSourceError};
use crate::port::{PoolReader, PriceFeed};

/// Winner when the observed value equals the target exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// `observed >= target` resolves YES.
    #[default]
    Yes,
    /// `observed > target` is required for YES.
    No,
}

/// What happens to the escrow when nobody holds the winning side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyWinningSide {
    /// Everyone receives zero; the escrow stays in the market.
    #[default]
    Forfeit,
    /// Every trader gets back their share of the escrow, pro rata to stake.
    Refund,
}

/// Handling of a missing, stale or unreadable value at resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum StaleValuePolicy {
    /// Fail the call; the caller retries later.
    #[default]
    Fail,
    /// Keep failing until `deadline + grace_secs`, then resolve as void.
    Void { grace_secs: u64 },
}

/// Resolution configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResolutionPolicy {
    pub tie_break: TieBreak,
    pub empty_winning_side: EmptyWinningSide,
    pub stale_value: StaleValuePolicy,
    /// Reject reference prices whose confidence exceeds this share of the price.
    pub max_confidence_bps: Option<u32>,
}

/// Summary of a completed resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub market_id: MarketId,
    pub outcome: Outcome,
    pub observed: Option<ObservedValue>,
    /// Outstanding shares on the winning side; zero for a void market.
    pub winning_shares: Fixed,
    pub resolved_at: i64,
}

/// Winning-side share totals, written once per market.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    winning: HashMap<MarketId, Fixed>,
}

impl ResolutionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the total for `market_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyResolved`] if a total is already stored.
    pub fn record_once(
        &mut self,
        market_id: MarketId,
        shares: Fixed,
    ) -> std::result::Result<(), LifecycleError> {
        if self.winning.contains_key(&market_id) {
            return Err(LifecycleError::AlreadyResolved(market_id));
        }
        self.winning.insert(market_id, shares);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, market_id: MarketId) -> Option<Fixed> {
        self.winning.get(&market_id).copied()
    }

    /// Stored total, or zero for unresolved and unknown markets.
    #[must_use]
    pub fn winning_shares(&self, market_id: MarketId) -> Fixed {
        self.get(market_id).unwrap_or(Fixed::ZERO)
    }
}

/// Resolves expired markets against their external value source.
pub struct ResolutionEngine {
    policy: ResolutionPolicy,
    price_feed: Arc<dyn PriceFeed>,
    pools: Arc<dyn PoolReader>,
    cache: ResolutionCache,
}

impl ResolutionEngine {
    pub fn new(
        policy: ResolutionPolicy,
        price_feed: Arc<dyn PriceFeed>,
        pools: Arc<dyn PoolReader>,
    ) -> Self {
        Self {
            policy,
            price_feed,
            pools,
            cache: ResolutionCache::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    #[must_use]
    pub fn price_feed(&self) -> &Arc<dyn PriceFeed> {
        &self.price_feed
    }

    /// Resolve `market_id` at time `now`.
    ///
    /// Nothing is written unless the whole call succeeds. A second call for
    /// the same market fails with `AlreadyResolved` and changes nothing.
    ///
    /// # Errors
    ///
    /// - `MarketNotFound` for an unknown id
    /// - `AlreadyResolved`, `NotYetExpired` for lifecycle problems
    /// - a [`ValueSourceError`] when no usable value exists and the policy
    ///   does not void the market
    pub fn resolve(
        &mut self,
        registry: &mut MarketRegistry,
        market_id: MarketId,
        now: i64,
    ) -> Result<ResolutionReport> {
        let market = registry.get(market_id)?;
        if market.is_resolved() || self.cache.get(market_id).is_some() {
            warn!(market_id = %market_id, "Resolution rejected: already resolved");
            return Err(LifecycleError::AlreadyResolved(market_id).into());
        }
        if now < market.deadline() {
            warn!(
                market_id = %market_id,
                deadline = market.deadline(),
                now,
                "Resolution rejected: deadline not reached"
            );
            return Err(LifecycleError::NotYetExpired {
                market_id,
                deadline: market.deadline(),
                now,
            }
            .into());
        }

        let (outcome, observed) = match self.observe(market) {
            Ok(observed) => (self.decide(market.target(), &observed)?, Some(observed)),
            Err(err) => {
                warn!(market_id = %market_id, error = %err, "Value source failed");
                match self.policy.stale_value {
                    StaleValuePolicy::Void { grace_secs }
                        if now >= market.deadline().saturating_add_unsigned(grace_secs) =>
                    {
                        (Outcome::Void, None)
                    }
                    _ => return Err(err.into()),
                }
            }
        };
        let winning_shares = outcome
            .winning_side()
            .map_or(Fixed::ZERO, |side| market.quantity(side));

        let book = registry.book_mut(market_id)?;
        book.market.resolve(Resolution {
            outcome,
            observed,
            resolved_at: now,
        })?;
        self.cache.record_once(market_id, winning_shares)?;

        info!(
            market_id = %market_id,
            outcome = %outcome,
            winning_shares = %winning_shares,
            "Market resolved"
        );
        Ok(ResolutionReport {
            market_id,
            outcome,
            observed,
            winning_shares,
            resolved_at: now,
        })
    }

    fn observe(&self, market: &Market) -> std::result::Result<ObservedValue, ValueSourceError> {
        match market.target() {
            ResolutionTarget::ReferencePrice { feed_id, .. } => {
                let price = self.price_feed.latest_price(feed_id)?;
                if price.publish_time < market.deadline() {
                    return Err(ValueSourceError::StalePrice {
                        feed_id: *feed_id,
                        publish_time: price.publish_time,
                        deadline: market.deadline(),
                    });
                }
                if let Some(max_bps) = self.policy.max_confidence_bps {
                    let spread = u128::from(price.confidence) * u128::from(BPS_DENOMINATOR);
                    let allowed = u128::from(price.price.unsigned_abs()) * u128::from(max_bps);
                    if spread > allowed {
                        return Err(ValueSourceError::ConfidenceTooWide {
                            price: price.price,
                            confidence: price.confidence,
                            max_bps,
                        });
                    }
                }
                Ok(ObservedValue::ReferencePrice {
                    price: price.price,
                    confidence: price.confidence,
                    exponent: price.exponent,
                    publish_time: price.publish_time,
                })
            }
            ResolutionTarget::PoolLiquidity { pool, .. } => {
                let liquidity = self.pools.liquidity(pool)?;
                Ok(ObservedValue::PoolLiquidity { liquidity })
            }
        }
    }

    fn decide(
        &self,
        target: &ResolutionTarget,
        observed: &ObservedValue,
    ) -> std::result::Result<Outcome, ValueSourceError> {
        let ordering = target.compare(observed).ok_or_else(|| {
            ValueSourceError::InvalidUpdate("observation does not match the market target".into())
        })?;
        Ok(match ordering {
            Ordering::Greater => Outcome::Yes,
            Ordering::Less => Outcome::No,
            Ordering::Equal => match self.policy.tie_break {
                TieBreak::Yes => Outcome::Yes,
                TieBreak::No => Outcome::No,
            },
        })
    }
}
