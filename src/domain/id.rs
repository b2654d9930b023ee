//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Market identifier - dense index into the market arena.
///
/// Ids are allocated sequentially from zero and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(u64);

impl MarketId {
    /// Create a `MarketId` from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Arena slot for this id, if it fits the platform's `usize`.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MarketId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Trader (account) identifier - newtype for type safety.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraderId(String);

impl TraderId {
    /// Create a new `TraderId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the trader ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TraderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TraderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reference price feed identifier (32 bytes, hex encoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(B256);

impl FeedId {
    /// Wrap raw feed id bytes.
    #[must_use]
    pub const fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    /// Get the feed id bytes.
    #[must_use]
    pub const fn bytes(&self) -> &B256 {
        &self.0
    }

    /// The all-zero id never names a real feed.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeedId {
    type Err = <B256 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s).map(Self)
    }
}

/// Liquidity pool reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(Address);

impl PoolId {
    /// Wrap a pool address.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Get the pool address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.0
    }

    /// The zero address never names a real pool.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Address::ZERO
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = <Address as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_str(s).map(Self)
    }
}
