//! LMSR pricing and fixed-point behavior through the public API.

mod support;

use lmsr_markets::domain::error::{MathError, PricingError, ValidationError};
use lmsr_markets::domain::lmsr::{self, MAX_SHARES, PRICE_SUM_TOLERANCE};
use lmsr_markets::domain::{Fixed, Side};
use support::assertions::{assert_fixed_near, fixed};

fn int(n: i64) -> Fixed {
    Fixed::from_int(n)
}

#[test]
fn empty_market_costs_b_ln_two() {
    for b in [1, 10, 1_000] {
        let cost = lmsr::cost(Fixed::ZERO, Fixed::ZERO, int(b)).unwrap();
        let expected = Fixed::LN_2.checked_mul(int(b)).unwrap();
        assert_fixed_near(cost, expected, 100 * i128::from(b));
        assert_eq!(lmsr::max_operator_loss(int(b)).unwrap(), expected);
    }
}

#[test]
fn prices_sum_to_one_across_states() {
    let b = int(25);
    let states = [
        (int(0), int(0)),
        (int(10), int(0)),
        (int(0), int(37)),
        (fixed("123.456"), fixed("7.5")),
        (int(500), int(499)),
    ];
    for (q_yes, q_no) in states {
        let (yes, no) = lmsr::prices(q_yes, q_no, b).unwrap();
        let sum = yes.checked_add(no).unwrap();
        assert_fixed_near(sum, Fixed::ONE, PRICE_SUM_TOLERANCE.raw());
        assert!(yes.raw() >= 0 && no.raw() >= 0);
    }
}

#[test]
fn buying_a_side_raises_its_price() {
    let b = int(10);
    let before = lmsr::price(int(3), int(3), b, Side::Yes).unwrap();
    let after = lmsr::price(int(4), int(3), b, Side::Yes).unwrap();
    assert!(after > before);

    let no_before = lmsr::price(int(3), int(3), b, Side::No).unwrap();
    let no_after = lmsr::price(int(3), int(4), b, Side::No).unwrap();
    assert!(no_after > no_before);
}

#[test]
fn price_is_symmetric_in_sides() {
    let b = int(7);
    let yes = lmsr::price(int(12), int(5), b, Side::Yes).unwrap();
    let no = lmsr::price(int(5), int(12), b, Side::No).unwrap();
    assert_eq!(yes, no);
}

#[test]
fn lopsided_market_stays_finite() {
    let b = int(1);
    let (yes, no) = lmsr::prices(int(1_000), Fixed::ZERO, b).unwrap();
    assert_fixed_near(yes, Fixed::ONE, PRICE_SUM_TOLERANCE.raw());
    assert!(no < fixed("0.000000001"));

    let cost = lmsr::cost(int(1_000), Fixed::ZERO, b).unwrap();
    assert_fixed_near(cost, int(1_000), 1_000_000);
}

#[test]
fn purchase_cost_is_path_independent() {
    let b = int(10);
    let direct = lmsr::purchase_cost(Fixed::ZERO, Fixed::ZERO, Side::Yes, int(5), b).unwrap();

    let first = lmsr::purchase_cost(Fixed::ZERO, Fixed::ZERO, Side::Yes, int(2), b).unwrap();
    let second = lmsr::purchase_cost(int(2), Fixed::ZERO, Side::Yes, int(3), b).unwrap();
    let split = first.checked_add(second).unwrap();

    assert_fixed_near(split, direct, 10);
}

#[test]
fn purchase_cost_is_bounded_by_shares() {
    let b = int(10);
    let shares = int(4);
    let cost = lmsr::purchase_cost(int(1), int(9), Side::Yes, shares, b).unwrap();
    let start = lmsr::price(int(1), int(9), b, Side::Yes).unwrap();

    assert!(cost < shares, "a share never costs more than one token");
    assert!(cost > start.checked_mul(shares).unwrap(), "price rises while buying");
}

#[test]
fn wrappers_match_single_sided_difference() {
    let b = int(10);
    let (q_yes, q_no) = (int(3), int(1));
    assert_eq!(
        lmsr::cost_to_buy_yes(q_yes, q_no, int(2), b).unwrap(),
        lmsr::cost_difference(q_yes, q_no, int(2), Fixed::ZERO, b).unwrap()
    );
    assert_eq!(
        lmsr::cost_to_buy_no(q_yes, q_no, int(2), b).unwrap(),
        lmsr::cost_difference(q_yes, q_no, Fixed::ZERO, int(2), b).unwrap()
    );
}

#[test]
fn invalid_inputs_are_rejected() {
    assert!(matches!(
        lmsr::cost(Fixed::ZERO, Fixed::ZERO, int(-1)),
        Err(PricingError::Validation(
            ValidationError::InvalidLiquidityParameter { .. }
        ))
    ));
    assert!(matches!(
        lmsr::price(int(-1), Fixed::ZERO, int(10), Side::Yes),
        Err(PricingError::Validation(
            ValidationError::InvalidShareQuantity { .. }
        ))
    ));
    let too_many = MAX_SHARES.checked_add(Fixed::ONE).unwrap();
    assert!(matches!(
        lmsr::cost(too_many, Fixed::ZERO, int(10)),
        Err(PricingError::Validation(
            ValidationError::ShareQuantityTooLarge { .. }
        ))
    ));
}

#[test]
fn exp_and_ln_respect_their_domains() {
    assert!(matches!(
        int(43).exp(),
        Err(MathError::ExpOutOfDomain { .. })
    ));
    assert!(matches!(
        Fixed::ZERO.ln(),
        Err(MathError::LogOfNonPositive { .. })
    ));
    let x = fixed("3.25");
    assert_fixed_near(x.exp().unwrap().ln().unwrap(), x, 10_000);
}

#[test]
fn fixed_parses_and_displays_decimals() {
    let value = fixed("0.5124947951");
    assert_eq!(value.to_string(), "0.5124947951");
    assert_eq!(fixed("-2").to_string(), "-2");
    assert!("abc".parse::<Fixed>().is_err());
}
