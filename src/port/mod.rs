//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams where the engine meets things it does not own:
//! the wall clock and the external value sources consulted at resolution.
//!
//! ```text
//!                 ┌─────────────────────────┐
//!                 │       Application       │
//!                 │   MarketEngine + Domain │
//!                 └────────────┬────────────┘
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//!     ┌─────────┐        ┌───────────┐       ┌────────────┐
//!     │  Clock  │        │ PriceFeed │       │ PoolReader │
//!     └─────────┘        └───────────┘       └────────────┘
//! ```

pub mod outbound;

pub use outbound::{Clock, PoolReader, PriceFeed, PriceObservation, PriceUpdate};
