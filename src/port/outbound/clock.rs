//! Time source port.

/// Source of the current time in unix seconds.
///
/// Every lifecycle decision (open, expired, resolvable) is made against
/// this clock, so tests and scenario replays substitute a manual one.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}
