//! Application services (use cases).
//!
//! These services orchestrate domain logic and the outbound ports to
//! implement market creation, trading, resolution and payouts.

pub mod engine;
pub mod ledger;
pub mod payout;
pub mod registry;
pub mod resolution;
pub mod shared;

pub use engine::{EngineSettings, MarketEngine, ResolutionStatus};
pub use ledger::{BuyOrder, Quote, TradeLedger, TradeReceipt};
pub use payout::PayoutCalculator;
pub use registry::{MarketBook, MarketRegistry};
pub use resolution::{
    EmptyWinningSide, ResolutionCache, ResolutionEngine, ResolutionPolicy, ResolutionReport,
    StaleValuePolicy, TieBreak,
};
pub use shared::SharedEngine;
