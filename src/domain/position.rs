//! Per-trader holdings in a single market.

use serde::Serialize;

use super::error::MathError;
use super::fixed::Fixed;
use super::market::Side;
use super::money::Amount;

/// Shares held by one trader in one market.
///
/// A trader may hold both sides from separate single-sided trades.
/// Positions only grow until the market resolves; afterwards the only
/// change is the claim flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    yes_shares: Fixed,
    no_shares: Fixed,
    stake: Amount,
    claimed: bool,
}

impl Position {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn yes_shares(&self) -> Fixed {
        self.yes_shares
    }

    #[must_use]
    pub const fn no_shares(&self) -> Fixed {
        self.no_shares
    }

    /// Shares held on one side.
    #[must_use]
    pub const fn shares(&self, side: Side) -> Fixed {
        match side {
            Side::Yes => self.yes_shares,
            Side::No => self.no_shares,
        }
    }

    /// Gross amount paid into the market, fees included.
    #[must_use]
    pub const fn stake(&self) -> Amount {
        self.stake
    }

    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Add a trade. Either both fields change or neither does.
    pub(crate) fn apply_trade(
        &mut self,
        side: Side,
        shares: Fixed,
        cost: Amount,
    ) -> Result<(), MathError> {
        let held = self.shares(side).checked_add(shares)?;
        let stake = self.stake.checked_add(cost).ok_or(MathError::Overflow)?;

        match side {
            Side::Yes => self.yes_shares = held,
            Side::No => self.no_shares = held,
        }
        self.stake = stake;
        Ok(())
    }

    pub(crate) fn mark_claimed(&mut self) {
        self.claimed = true;
    }
}
