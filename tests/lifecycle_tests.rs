//! Market lifecycle: creation, trading window, resolution and claims.

use lmsr_markets::application::{BuyOrder, SharedEngine};
use lmsr_markets::domain::{
    Fixed, LifecycleError, MarketStatus, Outcome, Side, ValidationError,
};
use lmsr_markets::error::{Error, ErrorCategory};
use lmsr_markets::testkit::domain::{
    feed, pool, pool_market, price_market, tokens, trader, units, ONE_DAY, START,
};
use lmsr_markets::testkit::TestHarness;

#[test]
fn market_ids_are_sequential_from_zero() {
    let mut h = TestHarness::new();
    let first = h.create(price_market(feed(1), 100, START + ONE_DAY, 10));
    let second = h.create(pool_market(pool(2), 1_000, START + ONE_DAY, 10));

    assert_eq!(first.value(), 0);
    assert_eq!(second.value(), 1);
    assert_eq!(h.engine.market_count(), 2);

    let market = h.engine.market(first).unwrap();
    assert_eq!(market.q_yes(), Fixed::ZERO);
    assert_eq!(market.balance_net(), 0);
    assert_eq!(market.fee_bps(), 150);
    assert_eq!(market.created_at(), START);
}

#[test]
fn creation_validates_inputs() {
    let mut h = TestHarness::new();

    let past = h.engine.create_market(price_market(feed(1), 100, START, 10));
    assert!(matches!(
        past,
        Err(Error::Validation(ValidationError::DeadlineNotInFuture { .. }))
    ));

    let no_liquidity = h
        .engine
        .create_market(price_market(feed(1), 100, START + 1, 0));
    assert!(matches!(
        no_liquidity,
        Err(Error::Validation(
            ValidationError::InvalidLiquidityParameter { .. }
        ))
    ));

    let zero_feed = h
        .engine
        .create_market(price_market(feed(0), 100, START + 1, 10));
    assert!(matches!(
        zero_feed,
        Err(Error::Validation(ValidationError::InvalidResolutionTarget { .. }))
    ));

    let mut blank = price_market(feed(1), 100, START + 1, 10);
    blank.description = "   ".into();
    assert!(matches!(
        h.engine.create_market(blank),
        Err(Error::Validation(ValidationError::EmptyDescription))
    ));

    assert_eq!(h.engine.market_count(), 0);
}

#[test]
fn trading_stops_at_the_deadline() {
    let mut h = TestHarness::new();
    let deadline = START + ONE_DAY;
    let id = h.create(price_market(feed(1), 100, deadline, 10));
    let alice = trader("alice");

    h.set_time(deadline - 1);
    h.buy_exact(id, &alice, Side::Yes, units(1)).unwrap();
    assert_eq!(h.engine.active_markets(), vec![id]);

    h.set_time(deadline);
    let err = h.buy_exact(id, &alice, Side::Yes, units(1)).unwrap_err();
    assert!(matches!(
        err,
        Error::Lifecycle(LifecycleError::MarketNotActive {
            status: MarketStatus::Expired,
            ..
        })
    ));
    assert_eq!(err.category(), ErrorCategory::Lifecycle);
    assert!(h.engine.active_markets().is_empty());
    assert_eq!(h.engine.expired_unresolved_markets(), vec![id]);
}

#[test]
fn resolution_requires_expiry_and_happens_once() {
    let mut h = TestHarness::new();
    let deadline = START + ONE_DAY;
    let id = h.create(price_market(feed(7), 3_000, deadline, 10));

    assert!(matches!(
        h.engine.resolve_market(id),
        Err(Error::Lifecycle(LifecycleError::NotYetExpired { .. }))
    ));

    h.set_time(deadline + 60);
    h.publish(feed(7), 3_500);
    let report = h.engine.resolve_market(id).unwrap();
    assert_eq!(report.outcome, Outcome::Yes);
    assert_eq!(report.resolved_at, deadline + 60);

    let status = h.engine.resolution_status(id);
    assert!(status.resolved && status.yes_wins);
    assert_eq!(h.engine.resolved_markets(), vec![id]);
    assert!(h.engine.expired_unresolved_markets().is_empty());

    assert!(matches!(
        h.engine.resolve_market(id),
        Err(Error::Lifecycle(LifecycleError::AlreadyResolved(_)))
    ));
}

#[test]
fn resolved_markets_reject_trades() {
    let mut h = TestHarness::new();
    let deadline = START + ONE_DAY;
    let id = h.create(pool_market(pool(3), 500, deadline, 10));
    h.set_time(deadline);
    h.set_liquidity(pool(3), 100);
    let report = h.engine.resolve_market(id).unwrap();
    assert_eq!(report.outcome, Outcome::No);

    let err = h
        .buy(id, &trader("late"), Side::No, units(1), tokens(1))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Lifecycle(LifecycleError::MarketNotActive {
            status: MarketStatus::Resolved,
            ..
        })
    ));
}

#[test]
fn unknown_markets_are_reported() {
    let mut h = TestHarness::new();
    let ghost = lmsr_markets::domain::MarketId::new(42);
    assert!(matches!(
        h.engine.buy(&BuyOrder {
            market_id: ghost,
            trader: trader("x"),
            side: Side::Yes,
            shares: units(1),
            payment: tokens(1),
        }),
        Err(Error::Validation(ValidationError::MarketNotFound(_)))
    ));
    assert!(matches!(
        h.engine.resolve_market(ghost),
        Err(Error::Validation(ValidationError::MarketNotFound(_)))
    ));
    assert!(matches!(
        h.engine.claim_payout(ghost, &trader("x")),
        Err(Error::Validation(ValidationError::MarketNotFound(_)))
    ));
}

#[test]
fn shared_engine_serializes_concurrent_buys() {
    let mut h = TestHarness::new();
    let id = h.create(price_market(feed(1), 100, START + ONE_DAY, 100));
    let shared = SharedEngine::new(h.engine);

    std::thread::scope(|scope| {
        for n in 0..8 {
            let shared = shared.clone();
            scope.spawn(move || {
                shared
                    .buy(&BuyOrder {
                        market_id: id,
                        trader: trader(&format!("t{n}")),
                        side: if n % 2 == 0 { Side::Yes } else { Side::No },
                        shares: units(1),
                        payment: tokens(1),
                    })
                    .unwrap();
            });
        }
    });

    shared.read(|engine| {
        let market = engine.market(id).unwrap();
        assert_eq!(market.q_yes(), units(4));
        assert_eq!(market.q_no(), units(4));
        assert_eq!(engine.participant_count(id), 8);
        assert_eq!(
            market.balance_net() + market.fees_accrued(),
            market.total_stake()
        );
    });
}

#[test]
fn lifecycle_sets_partition_every_market() {
    let mut h = TestHarness::new();
    let soon = h.create(pool_market(pool(1), 100, START + 100, 10));
    let later = h.create(pool_market(pool(2), 100, START + 200, 10));
    let open = h.create(pool_market(pool(3), 100, START + ONE_DAY, 10));

    let partition = |h: &TestHarness| {
        h.engine.active_markets().len()
            + h.engine.expired_unresolved_markets().len()
            + h.engine.resolved_markets().len()
    };

    h.set_time(START + 200);
    h.set_liquidity(pool(1), 150);
    assert_eq!(partition(&h) as u64, h.engine.market_count());
    assert_eq!(h.engine.expired_unresolved_markets(), vec![soon, later]);

    h.engine.resolve_market(soon).unwrap();
    assert_eq!(partition(&h) as u64, h.engine.market_count());
    assert_eq!(h.engine.active_markets(), vec![open]);
    assert_eq!(h.engine.expired_unresolved_markets(), vec![later]);
    assert_eq!(h.engine.resolved_markets(), vec![soon]);
}
