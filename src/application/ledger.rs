//! Trade ledger: prices buys, skims fees and updates positions.
//!
//! A buy is staged completely with checked arithmetic before anything is
//! written, so a failed buy leaves the market, the position and the global
//! totals exactly as they were.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use super::registry::MarketRegistry;
use crate::domain::money::fee_for;
use crate::domain::{
    lmsr, Amount, Fixed, MarketId, MathError, Side, TraderId, ValidationError,
};
use crate::error::Result;

/// A request to buy shares on one side of a market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyOrder {
    pub market_id: MarketId,
    pub trader: TraderId,
    pub side: Side,
    pub shares: Fixed,
    /// Collateral attached to the order, in base units.
    pub payment: Amount,
}

/// Settlement of a successful buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeReceipt {
    pub market_id: MarketId,
    pub side: Side,
    pub shares: Fixed,
    /// Gross cost charged, fee included.
    pub cost: Amount,
    pub fee: Amount,
    /// Part of the cost added to the market's escrow.
    pub net: Amount,
    /// Overpayment returned to the trader.
    pub refund: Amount,
    pub price_yes_after: Fixed,
    pub price_no_after: Fixed,
}

/// What a buy would cost right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub market_id: MarketId,
    pub side: Side,
    pub shares: Fixed,
    /// Minimum payment for the buy to succeed.
    pub cost: Amount,
    pub fee: Amount,
    pub net: Amount,
    pub price_yes_before: Fixed,
    pub price_no_before: Fixed,
    pub price_yes_after: Fixed,
    pub price_no_after: Fixed,
}

/// Platform-wide trade accounting.
#[derive(Debug, Default)]
pub struct TradeLedger {
    total_fees: Amount,
    traders: HashSet<TraderId>,
}

impl TradeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fees accrued across every market.
    #[must_use]
    pub const fn total_fees(&self) -> Amount {
        self.total_fees
    }

    /// Distinct traders that completed at least one buy.
    #[must_use]
    pub fn trader_count(&self) -> usize {
        self.traders.len()
    }

    /// Price a buy against committed state without changing anything.
    ///
    /// # Errors
    ///
    /// Fails for an unknown market, a market that no longer trades, or
    /// invalid share quantities.
    pub fn quote(
        &self,
        registry: &MarketRegistry,
        market_id: MarketId,
        side: Side,
        shares: Fixed,
        now: i64,
    ) -> Result<Quote> {
        let market = registry.get(market_id)?;
        market.ensure_active(now)?;
        reject_negative(shares)?;

        let b = market.liquidity();
        let (q_yes, q_no) = (market.q_yes(), market.q_no());
        let (price_yes_before, price_no_before) = lmsr::prices(q_yes, q_no, b)?;

        let cost = lmsr::purchase_cost(q_yes, q_no, side, shares, b)?.to_amount()?;
        let fee = fee_for(cost, market.fee_bps())?;
        let (after_yes, after_no) = quantities_after(q_yes, q_no, side, shares)?;
        let (price_yes_after, price_no_after) = lmsr::prices(after_yes, after_no, b)?;

        debug!(
            market_id = %market_id,
            side = %side,
            shares = %shares,
            cost,
            "Quote computed"
        );
        Ok(Quote {
            market_id,
            side,
            shares,
            cost,
            fee,
            net: cost - fee,
            price_yes_before,
            price_no_before,
            price_yes_after,
            price_no_after,
        })
    }

    /// Execute a buy.
    ///
    /// The trader pays the LMSR cost difference; `fee_bps` of it goes to the
    /// platform and the rest to the market's escrow. Any overpayment is
    /// refunded. A buy of zero shares succeeds without touching state.
    ///
    /// # Errors
    ///
    /// - `MarketNotFound`, `MarketNotActive` for lifecycle problems
    /// - `InvalidShareQuantity`, `ShareQuantityTooLarge` for bad quantities
    /// - `InsufficientPayment` when `payment` is below the cost
    /// - `Overflow` if any total would overflow
    pub fn buy(
        &mut self,
        registry: &mut MarketRegistry,
        order: &BuyOrder,
        now: i64,
    ) -> Result<TradeReceipt> {
        let book = registry.book_mut(order.market_id)?;
        book.market.ensure_active(now)?;
        reject_negative(order.shares)?;

        let b = book.market.liquidity();
        let (q_yes, q_no) = (book.market.q_yes(), book.market.q_no());

        if order.shares.is_zero() {
            let (price_yes_after, price_no_after) = lmsr::prices(q_yes, q_no, b)?;
            debug!(
                market_id = %order.market_id,
                trader = %order.trader,
                "Zero-share buy, nothing to do"
            );
            return Ok(TradeReceipt {
                market_id: order.market_id,
                side: order.side,
                shares: Fixed::ZERO,
                cost: 0,
                fee: 0,
                net: 0,
                refund: order.payment,
                price_yes_after,
                price_no_after,
            });
        }

        let cost = lmsr::purchase_cost(q_yes, q_no, order.side, order.shares, b)?.to_amount()?;
        if order.payment < cost {
            return Err(ValidationError::InsufficientPayment {
                required: cost,
                provided: order.payment,
            }
            .into());
        }
        let fee = fee_for(cost, book.market.fee_bps())?;
        let net = cost - fee;
        let refund = order.payment - cost;

        // Stage everything fallible.
        let total_fees = self.total_fees.checked_add(fee).ok_or(MathError::Overflow)?;
        let mut position = book
            .positions
            .get(&order.trader)
            .cloned()
            .unwrap_or_default();
        position.apply_trade(order.side, order.shares, cost)?;
        let (after_yes, after_no) = quantities_after(q_yes, q_no, order.side, order.shares)?;
        let (price_yes_after, price_no_after) = lmsr::prices(after_yes, after_no, b)?;
        book.market.apply_trade(order.side, order.shares, cost, fee)?;

        // Commit.
        book.positions.insert(order.trader.clone(), position);
        self.total_fees = total_fees;
        self.traders.insert(order.trader.clone());

        info!(
            market_id = %order.market_id,
            trader = %order.trader,
            side = %order.side,
            shares = %order.shares,
            cost,
            fee,
            refund,
            price_yes = %price_yes_after,
            "Trade executed"
        );
        Ok(TradeReceipt {
            market_id: order.market_id,
            side: order.side,
            shares: order.shares,
            cost,
            fee,
            net,
            refund,
            price_yes_after,
            price_no_after,
        })
    }
}

fn reject_negative(shares: Fixed) -> std::result::Result<(), ValidationError> {
    if shares.is_negative() {
        return Err(ValidationError::InvalidShareQuantity {
            reason: "share amount cannot be negative",
        });
    }
    Ok(())
}

/// Outstanding quantities once `shares` of `side` are added.
pub(crate) fn quantities_after(
    q_yes: Fixed,
    q_no: Fixed,
    side: Side,
    shares: Fixed,
) -> std::result::Result<(Fixed, Fixed), MathError> {
    Ok(match side {
        Side::Yes => (q_yes.checked_add(shares)?, q_no),
        Side::No => (q_yes, q_no.checked_add(shares)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeedId, LifecycleError, MarketConfig, ResolutionTarget};
    use crate::error::Error;
    use alloy_primitives::B256;

    const TOKEN: Amount = 1_000_000_000_000_000_000;

    fn setup() -> (MarketRegistry, TradeLedger, MarketId) {
        let mut registry = MarketRegistry::new();
        let id = registry
            .create(
                MarketConfig {
                    description: "BTC above 100k".into(),
                    deadline: 100,
                    liquidity: Fixed::from_int(10),
                    target: ResolutionTarget::ReferencePrice {
                        feed_id: FeedId::new(B256::repeat_byte(1)),
                        target_price: 100_000,
                    },
                    creator: TraderId::from("maker"),
                },
                150,
                0,
            )
            .unwrap();
        (registry, TradeLedger::new(), id)
    }

    fn order(id: MarketId, trader: &str, side: Side, shares: i64, payment: Amount) -> BuyOrder {
        BuyOrder {
            market_id: id,
            trader: TraderId::from(trader),
            side,
            shares: Fixed::from_int(shares),
            payment,
        }
    }

    #[test]
    fn buy_splits_cost_into_fee_and_escrow() {
        let (mut registry, mut ledger, id) = setup();
        let receipt = ledger
            .buy(&mut registry, &order(id, "alice", Side::Yes, 1, TOKEN), 10)
            .unwrap();

        assert!(receipt.cost > 0);
        assert_eq!(receipt.fee, receipt.cost * 150 / 10_000);
        assert_eq!(receipt.net + receipt.fee, receipt.cost);
        assert_eq!(receipt.refund, TOKEN - receipt.cost);

        let market = registry.get(id).unwrap();
        assert_eq!(market.balance_net(), receipt.net);
        assert_eq!(market.fees_accrued(), receipt.fee);
        assert_eq!(market.q_yes(), Fixed::ONE);
        assert_eq!(ledger.total_fees(), receipt.fee);
        assert_eq!(ledger.trader_count(), 1);
    }

    #[test]
    fn quote_matches_buy_and_mutates_nothing() {
        let (mut registry, mut ledger, id) = setup();
        let quote = ledger.quote(&registry, id, Side::No, Fixed::from_int(3), 10).unwrap();
        assert_eq!(registry.get(id).unwrap().q_no(), Fixed::ZERO);

        let receipt = ledger
            .buy(&mut registry, &order(id, "bob", Side::No, 3, quote.cost), 10)
            .unwrap();
        assert_eq!(receipt.cost, quote.cost);
        assert_eq!(receipt.fee, quote.fee);
        assert_eq!(receipt.refund, 0);
        assert_eq!(receipt.price_no_after, quote.price_no_after);
    }

    #[test]
    fn underpayment_is_rejected_without_state_change() {
        let (mut registry, mut ledger, id) = setup();
        let err = ledger
            .buy(&mut registry, &order(id, "carol", Side::Yes, 5, 1), 10)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InsufficientPayment { provided: 1, .. })
        ));

        let book = registry.book(id).unwrap();
        assert_eq!(book.market().q_yes(), Fixed::ZERO);
        assert_eq!(book.participant_count(), 0);
        assert_eq!(ledger.total_fees(), 0);
    }

    #[test]
    fn zero_share_buy_refunds_everything() {
        let (mut registry, mut ledger, id) = setup();
        let receipt = ledger
            .buy(&mut registry, &order(id, "dave", Side::No, 0, 500), 10)
            .unwrap();
        assert_eq!(receipt.cost, 0);
        assert_eq!(receipt.refund, 500);
        assert_eq!(registry.book(id).unwrap().participant_count(), 0);
        assert_eq!(ledger.trader_count(), 0);
    }

    #[test]
    fn buy_after_deadline_is_rejected() {
        let (mut registry, mut ledger, id) = setup();
        let err = ledger
            .buy(&mut registry, &order(id, "erin", Side::Yes, 1, TOKEN), 100)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Lifecycle(LifecycleError::MarketNotActive { .. })
        ));
    }

    #[test]
    fn negative_shares_are_rejected() {
        let (mut registry, mut ledger, id) = setup();
        let err = ledger
            .buy(&mut registry, &order(id, "frank", Side::Yes, -2, TOKEN), 10)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidShareQuantity { .. })
        ));
    }

    #[test]
    fn dust_buy_still_pays_for_its_shares() {
        let (mut registry, mut ledger, id) = setup();
        let dust = BuyOrder {
            shares: Fixed::from_raw(3),
            ..order(id, "gina", Side::No, 0, TOKEN)
        };
        let receipt = ledger.buy(&mut registry, &dust, 10).unwrap();
        assert!(receipt.cost > 0);
        assert_eq!(registry.get(id).unwrap().q_no(), Fixed::from_raw(3));
    }

    #[test]
    fn quantities_after_adds_to_the_bought_side_only() {
        let (yes, no) =
            quantities_after(Fixed::ONE, Fixed::from_int(2), Side::No, Fixed::ONE).unwrap();
        assert_eq!((yes, no), (Fixed::ONE, Fixed::from_int(3)));
    }
}
