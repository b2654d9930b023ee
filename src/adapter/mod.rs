//! Adapters: the command line on the inbound side, clocks and in-memory
//! value sources on the outbound side.

pub mod inbound;
pub mod outbound;
