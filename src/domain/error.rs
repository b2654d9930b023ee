//! Domain errors for market invariants and fixed-point math.
//!
//! Three families mirror how a caller can react:
//!
//! - [`ValidationError`] - the request itself is wrong and can be corrected
//! - [`LifecycleError`] - the request is valid but the market is in the wrong state
//! - [`MathError`] - a fixed-point operation left its domain or overflowed
//!
//! # Examples
//!
//! ```
//! use lmsr_markets::domain::error::{PricingError, ValidationError};
//! use lmsr_markets::domain::lmsr;
//! use lmsr_markets::domain::Fixed;
//!
//! let result = lmsr::cost(Fixed::ZERO, Fixed::ZERO, Fixed::ZERO);
//!
//! assert!(matches!(
//!     result,
//!     Err(PricingError::Validation(ValidationError::InvalidLiquidityParameter { .. }))
//! ));
//! ```

use thiserror::Error;

use super::fixed::Fixed;
use super::id::{MarketId, TraderId};
use super::market::MarketStatus;
use super::money::Amount;

/// Caller-correctable request errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The liquidity parameter `b` must be strictly positive.
    #[error("liquidity parameter must be positive, got {liquidity}")]
    InvalidLiquidityParameter {
        /// The rejected value.
        liquidity: Fixed,
    },

    /// A share quantity exceeds the largest supported outstanding quantity.
    #[error("share quantity {quantity} exceeds maximum {max}")]
    ShareQuantityTooLarge {
        /// The rejected quantity.
        quantity: Fixed,
        /// The configured ceiling.
        max: Fixed,
    },

    /// Negative quantities, or a trade touching both sides at once.
    #[error("invalid share quantity: {reason}")]
    InvalidShareQuantity {
        /// What was wrong with the quantities.
        reason: &'static str,
    },

    /// The payment does not cover the trade cost.
    #[error("insufficient payment: required {required}, provided {provided}")]
    InsufficientPayment {
        /// Cost of the trade in base units.
        required: Amount,
        /// Payment attached to the trade in base units.
        provided: Amount,
    },

    /// No market exists under this id.
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    /// Market deadlines must lie strictly in the future at creation.
    #[error("deadline {deadline} is not after current time {now}")]
    DeadlineNotInFuture {
        /// Requested deadline (unix seconds).
        deadline: i64,
        /// Time of the creation request (unix seconds).
        now: i64,
    },

    /// Markets need a non-blank description.
    #[error("market description cannot be empty")]
    EmptyDescription,

    /// The resolution target does not identify a usable value source.
    #[error("invalid resolution target: {reason}")]
    InvalidResolutionTarget {
        /// What was wrong with the target.
        reason: &'static str,
    },

    /// The trader holds nothing in this market.
    #[error("trader {trader} has no position in market {market_id}")]
    NoPosition {
        /// Market that was queried.
        market_id: MarketId,
        /// Trader without a position.
        trader: TraderId,
    },
}

/// The market exists but its lifecycle state forbids the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Trading is only allowed while the market is open.
    #[error("market {market_id} is not active ({status})")]
    MarketNotActive {
        /// Market the trade targeted.
        market_id: MarketId,
        /// Its status at the time of the request.
        status: MarketStatus,
    },

    /// Resolution happens exactly once.
    #[error("market {0} is already resolved")]
    AlreadyResolved(MarketId),

    /// Resolution is only possible once the deadline has passed.
    #[error("market {market_id} expires at {deadline}, current time {now}")]
    NotYetExpired {
        /// Market being resolved.
        market_id: MarketId,
        /// Its deadline (unix seconds).
        deadline: i64,
        /// Time of the request (unix seconds).
        now: i64,
    },

    /// Payouts are only defined after resolution.
    #[error("market {0} is not resolved")]
    NotResolved(MarketId),

    /// Each position is paid out once.
    #[error("trader {trader} already claimed from market {market_id}")]
    AlreadyClaimed {
        /// Market of the claim.
        market_id: MarketId,
        /// Trader who already claimed.
        trader: TraderId,
    },
}

/// Fixed-point arithmetic left its supported domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// `exp` input outside `[MIN_EXP, MAX_EXP]`.
    #[error("exp argument {x} outside supported domain")]
    ExpOutOfDomain {
        /// The rejected argument.
        x: Fixed,
    },

    /// `ln` is only defined for strictly positive inputs.
    #[error("ln argument {x} is not positive")]
    LogOfNonPositive {
        /// The rejected argument.
        x: Fixed,
    },

    /// An intermediate or final result does not fit the representation.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// YES and NO prices drifted apart from summing to one.
    #[error("prices sum to {sum}, outside tolerance of one")]
    PriceSumOutOfTolerance {
        /// The observed sum.
        sum: Fixed,
    },
}

/// Errors from the pricing functions: bad inputs or math failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Math(#[from] MathError),
}
