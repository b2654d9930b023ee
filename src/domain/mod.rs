//! Pure market types and pricing math.
//!
//! Nothing in here performs I/O or reads the clock; every operation takes
//! the current time or external values as arguments.

pub mod error;
pub mod fixed;
pub mod id;
pub mod lmsr;
pub mod market;
pub mod money;
pub mod position;

pub use error::{LifecycleError, MathError, PricingError, ValidationError};
pub use fixed::Fixed;
pub use id::{FeedId, MarketId, PoolId, TraderId};
pub use market::{
    Market, MarketConfig, MarketStatus, ObservedValue, Outcome, Resolution, ResolutionTarget,
    Side,
};
pub use money::{Amount, BPS_DENOMINATOR, DEFAULT_FEE_BPS};
pub use position::Position;
