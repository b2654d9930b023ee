//! Pull-based payouts in constant time per trader.
//!
//! A winning trader's payout is
//! `balance_net * trader_winning_shares / total_winning_shares`, where the
//! total comes from the resolution cache. Integer division truncates; the
//! leftover dust stays in the market unclaimed.

use super::resolution::EmptyWinningSide;
use crate::domain::money::mul_div;
use crate::domain::{Amount, Fixed, MathError, Market, Position};

/// Computes what a position is owed once its market is resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayoutCalculator {
    empty_winning_side: EmptyWinningSide,
}

impl PayoutCalculator {
    #[must_use]
    pub const fn new(empty_winning_side: EmptyWinningSide) -> Self {
        Self { empty_winning_side }
    }

    /// Amount owed to `position` in `market`.
    ///
    /// Zero for an unresolved market. `winning_total` is the cached share
    /// total for the winning side.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::Overflow`] if the result does not fit an [`Amount`].
    pub fn payout(
        &self,
        market: &Market,
        position: &Position,
        winning_total: Fixed,
    ) -> Result<Amount, MathError> {
        let Some(outcome) = market.outcome() else {
            return Ok(0);
        };

        match outcome.winning_side() {
            Some(side) if winning_total.is_positive() => mul_div(
                market.balance_net(),
                position.shares(side).to_amount()?,
                winning_total.to_amount()?,
            ),
            Some(_) => match self.empty_winning_side {
                EmptyWinningSide::Forfeit => Ok(0),
                EmptyWinningSide::Refund => refund_by_stake(market, position),
            },
            // Void
            None => refund_by_stake(market, position),
        }
    }
}

fn refund_by_stake(market: &Market, position: &Position) -> Result<Amount, MathError> {
    if market.total_stake() == 0 {
        return Ok(0);
    }
    mul_div(market.balance_net(), position.stake(), market.total_stake())
}
