//! Fees, escrow, refunds and payouts.

use lmsr_markets::domain::{Fixed, Outcome, Side, ValidationError};
use lmsr_markets::error::Error;
use lmsr_markets::testkit::config;
use lmsr_markets::testkit::domain::{
    feed, price_market, tokens, trader, units, ONE_DAY, START,
};
use lmsr_markets::testkit::TestHarness;

#[test]
fn fee_is_carved_out_of_the_cost() {
    let mut h = TestHarness::new();
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let alice = trader("alice");

    let receipt = h.buy(id, &alice, Side::Yes, units(1), tokens(1)).unwrap();
    assert_eq!(receipt.fee, receipt.cost * 150 / 10_000);
    assert_eq!(receipt.net, receipt.cost - receipt.fee);
    assert_eq!(receipt.refund, tokens(1) - receipt.cost);

    let market = h.engine.market(id).unwrap();
    assert_eq!(market.balance_net(), receipt.net);
    assert_eq!(h.engine.platform_fees(id), receipt.fee);
    assert_eq!(h.engine.total_platform_fees(), receipt.fee);

    let position = h.engine.position(id, &alice).unwrap();
    assert_eq!(position.yes_shares(), units(1));
    assert_eq!(position.stake(), receipt.cost);
}

#[test]
fn fees_and_escrow_are_tracked_per_market() {
    let mut h = TestHarness::new();
    let first = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let second = h.create(price_market(feed(2), 100, START + ONE_DAY, 40));

    let trades = [
        (first, "alice", Side::Yes, 1),
        (second, "carol", Side::Yes, 7),
        (first, "bob", Side::No, 3),
        (second, "alice", Side::No, 2),
        (first, "dave", Side::Yes, 12),
        (second, "erin", Side::No, 25),
    ];
    let mut fees = [0_u128; 2];
    let mut nets = [0_u128; 2];
    let mut costs = [0_u128; 2];
    for (id, name, side, shares) in trades {
        let receipt = h.buy_exact(id, &trader(name), side, units(shares)).unwrap();
        assert_eq!(receipt.fee, receipt.cost * 150 / 10_000);
        let slot = usize::from(id != first);
        fees[slot] += receipt.fee;
        nets[slot] += receipt.net;
        costs[slot] += receipt.cost;
    }

    for (slot, id) in [first, second].into_iter().enumerate() {
        assert_eq!(h.engine.platform_fees(id), fees[slot]);
        assert_eq!(h.engine.market_balance(id), nets[slot]);
        assert_eq!(h.engine.market_balance(id), costs[slot] - fees[slot]);
        assert_eq!(h.engine.market(id).unwrap().total_stake(), costs[slot]);
    }
    assert_eq!(h.engine.total_platform_fees(), fees[0] + fees[1]);
    assert_eq!(h.engine.participant_count(first), 3);
    assert_eq!(h.engine.participant_count(second), 3);
    assert_eq!(h.engine.total_participants(), 5);
}

#[test]
fn insufficient_payment_changes_nothing() {
    let mut h = TestHarness::new();
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let quote = h.engine.quote(id, Side::No, units(2)).unwrap();

    let err = h
        .buy(id, &trader("bob"), Side::No, units(2), quote.cost - 1)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InsufficientPayment { required, .. }) if required == quote.cost
    ));

    let market = h.engine.market(id).unwrap();
    assert_eq!(market.q_no(), Fixed::ZERO);
    assert_eq!(market.balance_net(), 0);
    assert_eq!(h.engine.participant_count(id), 0);
    assert_eq!(h.engine.total_participants(), 0);
}

#[test]
fn zero_share_buy_refunds_everything() {
    let mut h = TestHarness::new();
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let receipt = h
        .buy(id, &trader("carol"), Side::Yes, Fixed::ZERO, tokens(3))
        .unwrap();

    assert_eq!(receipt.cost, 0);
    assert_eq!(receipt.refund, tokens(3));
    assert!(h.engine.position(id, &trader("carol")).is_none());
    assert_eq!(h.engine.participant_count(id), 0);
}

#[test]
fn negative_shares_are_rejected() {
    let mut h = TestHarness::new();
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let err = h
        .buy(id, &trader("eve"), Side::Yes, units(-1), tokens(1))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidShareQuantity { .. })
    ));
}

#[test]
fn fee_rate_is_fixed_at_creation() {
    let mut h = TestHarness::with_settings(config::with_fee(0));
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let receipt = h.buy_exact(id, &trader("a"), Side::Yes, units(1)).unwrap();
    assert_eq!(receipt.fee, 0);
    assert_eq!(h.engine.market_balance(id), receipt.cost);
}

#[test]
fn winners_split_the_escrow_pro_rata() {
    let mut h = TestHarness::new();
    let deadline = START + ONE_DAY;
    let id = h.create(price_market(feed(9), 2_000, deadline, 20));
    let (alice, bob, carol) = (trader("alice"), trader("bob"), trader("carol"));

    h.buy_exact(id, &alice, Side::Yes, units(3)).unwrap();
    h.buy_exact(id, &bob, Side::No, units(5)).unwrap();
    h.buy_exact(id, &carol, Side::Yes, units(1)).unwrap();
    let escrow = h.engine.market_balance(id);

    h.set_time(deadline);
    h.publish(feed(9), 2_500);
    let report = h.engine.resolve_market(id).unwrap();
    assert_eq!(report.outcome, Outcome::Yes);
    assert_eq!(report.winning_shares, units(4));
    assert_eq!(h.engine.winning_shares(id), units(4));

    assert_eq!(h.engine.payout(id, &alice), escrow * 3 / 4);
    assert_eq!(h.engine.payout(id, &carol), escrow / 4);
    assert_eq!(h.engine.payout(id, &bob), 0);

    let paid = h.engine.claim_payout(id, &alice).unwrap()
        + h.engine.claim_payout(id, &carol).unwrap()
        + h.engine.claim_payout(id, &bob).unwrap();
    assert!(paid <= escrow);
    assert!(escrow - paid < 2, "only rounding dust stays behind");
    assert_eq!(h.engine.market(id).unwrap().paid_out(), paid);

    // Claimed payouts are still readable.
    assert_eq!(h.engine.payout(id, &alice), escrow * 3 / 4);
}

#[test]
fn payout_is_zero_before_resolution() {
    let mut h = TestHarness::new();
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    h.buy_exact(id, &trader("a"), Side::Yes, units(2)).unwrap();
    assert_eq!(h.engine.payout(id, &trader("a")), 0);
    assert_eq!(h.engine.payout(id, &trader("nobody")), 0);
}

#[test]
fn empty_winning_side_forfeits_by_default() {
    let mut h = TestHarness::new();
    let deadline = START + ONE_DAY;
    let id = h.create(price_market(feed(4), 100, deadline, 10));
    h.buy_exact(id, &trader("a"), Side::No, units(2)).unwrap();

    h.set_time(deadline);
    h.publish(feed(4), 150);
    h.engine.resolve_market(id).unwrap();

    assert_eq!(h.engine.winning_shares(id), Fixed::ZERO);
    assert_eq!(h.engine.payout(id, &trader("a")), 0);
}

#[test]
fn empty_winning_side_refunds_under_refund_policy() {
    let mut h = TestHarness::with_settings(config::with_policy(config::refund_policy()));
    let deadline = START + ONE_DAY;
    let id = h.create(price_market(feed(4), 100, deadline, 10));
    h.buy_exact(id, &trader("a"), Side::No, units(3)).unwrap();
    h.buy_exact(id, &trader("b"), Side::No, units(1)).unwrap();
    let escrow = h.engine.market_balance(id);
    let stake_a = h.engine.position(id, &trader("a")).unwrap().stake();
    let total = h.engine.market(id).unwrap().total_stake();

    h.set_time(deadline);
    h.publish(feed(4), 150);
    h.engine.resolve_market(id).unwrap();

    let expected = escrow * stake_a / total;
    assert_eq!(h.engine.claim_payout(id, &trader("a")).unwrap(), expected);
    let rest = h.engine.claim_payout(id, &trader("b")).unwrap();
    assert!(expected + rest <= escrow);
}
