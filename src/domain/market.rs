//! Market-related domain types.
//!
//! - [`Market`] - A binary LMSR market with its escrow accounting
//! - [`MarketConfig`] - Creation request for a market
//! - [`ResolutionTarget`] - What the market settles against
//! - [`Side`], [`Outcome`], [`MarketStatus`] - Small tags used throughout

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{LifecycleError, MathError, ValidationError};
use super::fixed::Fixed;
use super::id::{FeedId, MarketId, PoolId, TraderId};
use super::money::Amount;

/// One side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
        }
    }
}

/// Error parsing a [`Side`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown side '{0}', expected 'yes' or 'no'")]
pub struct ParseSideError(String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// Lifecycle state of a market at a given time.
///
/// Derived from the resolution flag and the deadline; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Accepting trades (`now < deadline`).
    Open,
    /// Deadline passed, waiting for resolution.
    Expired,
    /// Terminal. Payouts available.
    Resolved,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Expired => write!(f, "expired"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// Final outcome of a resolved market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
    /// No usable value before the grace period ran out; stakes are refunded.
    Void,
}

impl Outcome {
    /// The side whose shares pay out, if any.
    #[must_use]
    pub const fn winning_side(self) -> Option<Side> {
        match self {
            Self::Yes => Some(Side::Yes),
            Self::No => Some(Side::No),
            Self::Void => None,
        }
    }

    #[must_use]
    pub const fn yes_wins(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Yes => Self::Yes,
            Side::No => Self::No,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::Void => write!(f, "void"),
        }
    }
}

/// The external value a market settles against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionTarget {
    /// YES if the feed's published price reaches `target_price`
    /// (in the feed's native integer units).
    ReferencePrice { feed_id: FeedId, target_price: i64 },
    /// YES if the pool's live liquidity reaches `target_liquidity`.
    PoolLiquidity { pool: PoolId, target_liquidity: u128 },
}

impl ResolutionTarget {
    /// Check that the target names a real source and a positive threshold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::ReferencePrice {
                feed_id,
                target_price,
            } => {
                if feed_id.is_zero() {
                    return Err(ValidationError::InvalidResolutionTarget {
                        reason: "feed id cannot be zero",
                    });
                }
                if *target_price <= 0 {
                    return Err(ValidationError::InvalidResolutionTarget {
                        reason: "target price must be positive",
                    });
                }
            }
            Self::PoolLiquidity {
                pool,
                target_liquidity,
            } => {
                if pool.is_zero() {
                    return Err(ValidationError::InvalidResolutionTarget {
                        reason: "pool address cannot be zero",
                    });
                }
                if *target_liquidity == 0 {
                    return Err(ValidationError::InvalidResolutionTarget {
                        reason: "target liquidity must be positive",
                    });
                }
            }
        }
        Ok(())
    }

    /// Compare an observation with the target.
    ///
    /// Returns `None` when the observation comes from the other kind of source.
    #[must_use]
    pub fn compare(&self, observed: &ObservedValue) -> Option<Ordering> {
        match (self, observed) {
            (Self::ReferencePrice { target_price, .. }, ObservedValue::ReferencePrice { price, .. }) => {
                Some(price.cmp(target_price))
            }
            (
                Self::PoolLiquidity {
                    target_liquidity, ..
                },
                ObservedValue::PoolLiquidity { liquidity },
            ) => Some(liquidity.cmp(target_liquidity)),
            _ => None,
        }
    }
}

/// A value read from the external source at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObservedValue {
    ReferencePrice {
        price: i64,
        confidence: u64,
        exponent: i32,
        publish_time: i64,
    },
    PoolLiquidity {
        liquidity: u128,
    },
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferencePrice {
                price,
                confidence,
                exponent,
                ..
            } => write!(f, "{price}±{confidence}e{exponent}"),
            Self::PoolLiquidity { liquidity } => write!(f, "{liquidity}"),
        }
    }
}

/// Recorded result of resolving a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub outcome: Outcome,
    /// `None` when the market was voided without a usable observation.
    pub observed: Option<ObservedValue>,
    pub resolved_at: i64,
}

/// Request to create a market.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub description: String,
    /// Unix seconds after which trading stops.
    pub deadline: i64,
    /// LMSR liquidity parameter `b`.
    pub liquidity: Fixed,
    pub target: ResolutionTarget,
    pub creator: TraderId,
}

impl MarketConfig {
    /// Check the creation invariants against the current time.
    pub fn validate(&self, now: i64) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if self.deadline <= now {
            return Err(ValidationError::DeadlineNotInFuture {
                deadline: self.deadline,
                now,
            });
        }
        if !self.liquidity.is_positive() {
            return Err(ValidationError::InvalidLiquidityParameter {
                liquidity: self.liquidity,
            });
        }
        self.target.validate()
    }
}

/// A binary LMSR market.
///
/// Outstanding quantities only grow, and freeze once the market is resolved.
/// `balance_net` holds the escrow for this market alone.
#[derive(Debug, Clone)]
pub struct Market {
    id: MarketId,
    description: String,
    deadline: i64,
    liquidity: Fixed,
    q_yes: Fixed,
    q_no: Fixed,
    creator: TraderId,
    target: ResolutionTarget,
    fee_bps: u32,
    balance_net: Amount,
    fees_accrued: Amount,
    total_stake: Amount,
    paid_out: Amount,
    resolution: Option<Resolution>,
    created_at: i64,
}

impl Market {
    /// Open a market from an already validated config.
    pub(crate) fn open(id: MarketId, config: MarketConfig, fee_bps: u32, created_at: i64) -> Self {
        Self {
            id,
            description: config.description,
            deadline: config.deadline,
            liquidity: config.liquidity,
            q_yes: Fixed::ZERO,
            q_no: Fixed::ZERO,
            creator: config.creator,
            target: config.target,
            fee_bps,
            balance_net: 0,
            fees_accrued: 0,
            total_stake: 0,
            paid_out: 0,
            resolution: None,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> MarketId {
        self.id
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn deadline(&self) -> i64 {
        self.deadline
    }

    /// Liquidity parameter `b`.
    #[must_use]
    pub const fn liquidity(&self) -> Fixed {
        self.liquidity
    }

    #[must_use]
    pub const fn q_yes(&self) -> Fixed {
        self.q_yes
    }

    #[must_use]
    pub const fn q_no(&self) -> Fixed {
        self.q_no
    }

    /// Outstanding quantity on one side.
    #[must_use]
    pub const fn quantity(&self, side: Side) -> Fixed {
        match side {
            Side::Yes => self.q_yes,
            Side::No => self.q_no,
        }
    }

    #[must_use]
    pub const fn creator(&self) -> &TraderId {
        &self.creator
    }

    #[must_use]
    pub const fn target(&self) -> &ResolutionTarget {
        &self.target
    }

    /// Fee rate in basis points, fixed at creation.
    #[must_use]
    pub const fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Escrowed funds net of platform fees.
    #[must_use]
    pub const fn balance_net(&self) -> Amount {
        self.balance_net
    }

    #[must_use]
    pub const fn fees_accrued(&self) -> Amount {
        self.fees_accrued
    }

    /// Sum of gross trade costs.
    #[must_use]
    pub const fn total_stake(&self) -> Amount {
        self.total_stake
    }

    /// Sum of payouts already claimed.
    #[must_use]
    pub const fn paid_out(&self) -> Amount {
        self.paid_out
    }

    #[must_use]
    pub const fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        match &self.resolution {
            Some(resolution) => Some(resolution.outcome),
            None => None,
        }
    }

    #[must_use]
    pub const fn created_at(&self) -> i64 {
        self.created_at
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    #[must_use]
    pub fn status(&self, now: i64) -> MarketStatus {
        if self.is_resolved() {
            MarketStatus::Resolved
        } else if now < self.deadline {
            MarketStatus::Open
        } else {
            MarketStatus::Expired
        }
    }

    /// Ensure trades are accepted at `now`.
    pub fn ensure_active(&self, now: i64) -> Result<(), LifecycleError> {
        match self.status(now) {
            MarketStatus::Open => Ok(()),
            status => Err(LifecycleError::MarketNotActive {
                market_id: self.id,
                status,
            }),
        }
    }

    /// Apply a priced trade. Either every field changes or none does.
    pub(crate) fn apply_trade(
        &mut self,
        side: Side,
        shares: Fixed,
        cost: Amount,
        fee: Amount,
    ) -> Result<(), MathError> {
        let net = cost.checked_sub(fee).ok_or(MathError::Overflow)?;
        let quantity = self.quantity(side).checked_add(shares)?;
        let balance_net = self.balance_net.checked_add(net).ok_or(MathError::Overflow)?;
        let fees_accrued = self.fees_accrued.checked_add(fee).ok_or(MathError::Overflow)?;
        let total_stake = self.total_stake.checked_add(cost).ok_or(MathError::Overflow)?;

        match side {
            Side::Yes => self.q_yes = quantity,
            Side::No => self.q_no = quantity,
        }
        self.balance_net = balance_net;
        self.fees_accrued = fees_accrued;
        self.total_stake = total_stake;
        Ok(())
    }

    /// Record the resolution. Happens once.
    pub(crate) fn resolve(&mut self, resolution: Resolution) -> Result<(), LifecycleError> {
        if self.is_resolved() {
            return Err(LifecycleError::AlreadyResolved(self.id));
        }
        self.resolution = Some(resolution);
        Ok(())
    }

    /// Record a claimed payout against the escrow.
    pub(crate) fn record_payout(&mut self, amount: Amount) -> Result<(), MathError> {
        let paid_out = self.paid_out.checked_add(amount).ok_or(MathError::Overflow)?;
        if paid_out > self.balance_net {
            return Err(MathError::Overflow);
        }
        self.paid_out = paid_out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};

    fn feed() -> FeedId {
        FeedId::new(B256::repeat_byte(0x11))
    }

    fn config() -> MarketConfig {
        MarketConfig {
            description: "Will ETH close above 3000?".into(),
            deadline: 1_000,
            liquidity: Fixed::from_int(10),
            target: ResolutionTarget::ReferencePrice {
                feed_id: feed(),
                target_price: 3_000,
            },
            creator: TraderId::from("creator"),
        }
    }

    #[test]
    fn config_validation() {
        assert!(config().validate(0).is_ok());

        assert_eq!(
            config().validate(1_000),
            Err(ValidationError::DeadlineNotInFuture {
                deadline: 1_000,
                now: 1_000
            })
        );

        let mut blank = config();
        blank.description = "   ".into();
        assert_eq!(blank.validate(0), Err(ValidationError::EmptyDescription));

        let mut flat = config();
        flat.liquidity = Fixed::ZERO;
        assert!(matches!(
            flat.validate(0),
            Err(ValidationError::InvalidLiquidityParameter { .. })
        ));
    }

    #[test]
    fn target_validation() {
        let zero_feed = ResolutionTarget::ReferencePrice {
            feed_id: FeedId::new(B256::ZERO),
            target_price: 1,
        };
        assert!(zero_feed.validate().is_err());

        let zero_pool = ResolutionTarget::PoolLiquidity {
            pool: PoolId::new(Address::ZERO),
            target_liquidity: 5,
        };
        assert!(zero_pool.validate().is_err());

        let no_threshold = ResolutionTarget::PoolLiquidity {
            pool: PoolId::new(Address::repeat_byte(0x22)),
            target_liquidity: 0,
        };
        assert!(no_threshold.validate().is_err());
    }

    #[test]
    fn compare_only_matching_kinds() {
        let target = config().target;
        let price = ObservedValue::ReferencePrice {
            price: 3_000,
            confidence: 1,
            exponent: -8,
            publish_time: 1_000,
        };
        assert_eq!(target.compare(&price), Some(Ordering::Equal));
        assert_eq!(
            target.compare(&ObservedValue::PoolLiquidity { liquidity: 1 }),
            None
        );
    }

    #[test]
    fn status_follows_deadline_and_resolution() {
        let mut market = Market::open(MarketId::new(0), config(), 150, 0);
        assert_eq!(market.status(999), MarketStatus::Open);
        assert_eq!(market.status(1_000), MarketStatus::Expired);

        market
            .resolve(Resolution {
                outcome: Outcome::Yes,
                observed: None,
                resolved_at: 1_000,
            })
            .unwrap();
        assert_eq!(market.status(0), MarketStatus::Resolved);
        assert!(matches!(
            market.resolve(Resolution {
                outcome: Outcome::No,
                observed: None,
                resolved_at: 1_001,
            }),
            Err(LifecycleError::AlreadyResolved(_))
        ));
        assert_eq!(market.outcome(), Some(Outcome::Yes));
    }

    #[test]
    fn apply_trade_updates_accounting() {
        let mut market = Market::open(MarketId::new(0), config(), 150, 0);
        market.apply_trade(Side::No, Fixed::from_int(2), 1_000, 15).unwrap();

        assert_eq!(market.q_no(), Fixed::from_int(2));
        assert_eq!(market.q_yes(), Fixed::ZERO);
        assert_eq!(market.balance_net(), 985);
        assert_eq!(market.fees_accrued(), 15);
        assert_eq!(market.total_stake(), 1_000);
    }

    #[test]
    fn failed_trade_leaves_market_untouched() {
        let mut market = Market::open(MarketId::new(0), config(), 150, 0);
        assert!(market.apply_trade(Side::Yes, Fixed::ONE, 10, 20).is_err());
        assert_eq!(market.q_yes(), Fixed::ZERO);
        assert_eq!(market.balance_net(), 0);
    }

    #[test]
    fn payouts_cannot_exceed_escrow() {
        let mut market = Market::open(MarketId::new(0), config(), 150, 0);
        market.apply_trade(Side::Yes, Fixed::ONE, 100, 0).unwrap();
        market.record_payout(60).unwrap();
        assert!(market.record_payout(41).is_err());
        assert_eq!(market.paid_out(), 60);
    }

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("YES".parse::<Side>().unwrap(), Side::Yes);
        assert_eq!("no".parse::<Side>().unwrap(), Side::No);
        assert!("maybe".parse::<Side>().is_err());
        assert_eq!(Side::Yes.opposite(), Side::No);
    }
}
