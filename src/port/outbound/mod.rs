//! Outbound ports: collaborators the engine calls out to.

mod clock;
mod value_source;

pub use clock::Clock;
pub use value_source::{PoolReader, PriceFeed, PriceObservation, PriceUpdate};
