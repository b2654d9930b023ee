//! Outbound adapters implementing the port traits.

mod clock;
mod memory;

pub use clock::{ManualClock, SystemClock};
pub use memory::{InMemoryPoolBook, InMemoryPriceFeed};
