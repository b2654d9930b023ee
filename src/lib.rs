//! LMSR market maker for binary prediction markets.
//!
//! Markets are priced by Hanson's logarithmic market scoring rule in
//! 18-decimal fixed point, collect a platform fee on every buy, and settle
//! against an external value: a reference price feed or a pool's liquidity.
//!
//! # Modules
//!
//! - [`domain`] - `Fixed` arithmetic, the `lmsr` pricing functions, markets,
//!   positions and the domain error taxonomy
//! - [`port`] - Traits for the clock, price feed and pool reader
//! - [`application`] - Registry, trade ledger, resolution, payouts and the
//!   [`MarketEngine`](application::MarketEngine) facade
//! - [`adapter`] - The CLI, clocks and in-memory value sources
//! - [`infrastructure`] - Configuration, logging and scenario replay
//! - [`error`] - Crate-wide error type
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lmsr_markets::adapter::outbound::{InMemoryPoolBook, InMemoryPriceFeed, ManualClock};
//! use lmsr_markets::application::{BuyOrder, EngineSettings, MarketEngine};
//! use lmsr_markets::domain::{Fixed, MarketConfig, ResolutionTarget, Side, TraderId};
//!
//! let mut engine = MarketEngine::new(
//!     EngineSettings::default(),
//!     Arc::new(ManualClock::new(1_000)),
//!     Arc::new(InMemoryPriceFeed::new(0)),
//!     Arc::new(InMemoryPoolBook::new()),
//! );
//! let market_id = engine
//!     .create_market(MarketConfig {
//!         description: "ETH above 4000".into(),
//!         deadline: 2_000,
//!         liquidity: Fixed::from_int(10),
//!         target: ResolutionTarget::ReferencePrice {
//!             feed_id: "0x1111111111111111111111111111111111111111111111111111111111111111"
//!                 .parse()
//!                 .unwrap(),
//!             target_price: 4_000,
//!         },
//!         creator: TraderId::from("maker"),
//!     })
//!     .unwrap();
//!
//! let quote = engine.quote(market_id, Side::Yes, Fixed::ONE).unwrap();
//! let receipt = engine
//!     .buy(&BuyOrder {
//!         market_id,
//!         trader: TraderId::from("alice"),
//!         side: Side::Yes,
//!         shares: Fixed::ONE,
//!         payment: quote.cost,
//!     })
//!     .unwrap();
//! assert_eq!(receipt.refund, 0);
//! assert!(receipt.price_yes_after > quote.price_yes_before);
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
