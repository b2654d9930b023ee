//! Logarithmic Market Scoring Rule pricing for binary markets.
//!
//! For outstanding quantities `(q_yes, q_no)` and liquidity `b`:
//!
//! ```text
//! C(q_yes, q_no)  = b * ln(e^(q_yes/b) + e^(q_no/b))
//! p(side)         = e^(q_side/b) / (e^(q_yes/b) + e^(q_no/b))
//! cost of a trade = C(after) - C(before)
//! ```
//!
//! The operator's worst-case loss is `b * ln 2`, which is why `b` is fixed at
//! market creation.
//!
//! Exponentials are evaluated relative to `m = max(q_yes, q_no)`:
//! `C = m + b * ln(e^((q_yes-m)/b) + e^((q_no-m)/b))`. This is the same value,
//! but every exponent lies in `[MIN_EXP, 0]`, so no quantity below
//! [`MAX_SHARES`] can push `exp` out of its domain. A term whose exponent is
//! below [`Fixed::MIN_EXP`] is worth less than one raw unit and counts as zero.

use super::error::{MathError, PricingError, ValidationError};
use super::fixed::Fixed;
use super::market::Side;

/// Largest outstanding quantity on either side: one billion shares.
pub const MAX_SHARES: Fixed = Fixed::from_int(1_000_000_000);

/// Floor on the cost of a non-empty trade.
const MIN_TRADE_COST: Fixed = Fixed::from_raw(1);

/// Allowed distance of `p(YES) + p(NO)` from one: `1e-15`.
pub const PRICE_SUM_TOLERANCE: Fixed = Fixed::from_raw(1_000);

fn validate_liquidity(b: Fixed) -> Result<(), ValidationError> {
    if !b.is_positive() {
        return Err(ValidationError::InvalidLiquidityParameter { liquidity: b });
    }
    Ok(())
}

fn validate_quantity(quantity: Fixed) -> Result<(), ValidationError> {
    if quantity.is_negative() {
        return Err(ValidationError::InvalidShareQuantity {
            reason: "quantities cannot be negative",
        });
    }
    if quantity > MAX_SHARES {
        return Err(ValidationError::ShareQuantityTooLarge {
            quantity,
            max: MAX_SHARES,
        });
    }
    Ok(())
}

/// `e^((q - shift)/b)`, zero when the exponent underflows the domain.
fn shifted_exp(quantity: Fixed, shift: Fixed, b: Fixed) -> Result<Fixed, MathError> {
    let x = quantity.checked_sub(shift)?.checked_div(b)?;
    if x < Fixed::MIN_EXP {
        return Ok(Fixed::ZERO);
    }
    x.exp()
}

struct Exponentials {
    yes: Fixed,
    no: Fixed,
    shift: Fixed,
}

impl Exponentials {
    fn new(q_yes: Fixed, q_no: Fixed, b: Fixed) -> Result<Self, PricingError> {
        validate_liquidity(b)?;
        validate_quantity(q_yes)?;
        validate_quantity(q_no)?;

        let shift = q_yes.max(q_no);
        Ok(Self {
            yes: shifted_exp(q_yes, shift, b)?,
            no: shifted_exp(q_no, shift, b)?,
            shift,
        })
    }

    fn sum(&self) -> Result<Fixed, MathError> {
        self.yes.checked_add(self.no)
    }
}

/// LMSR cost function `C(q_yes, q_no)`.
///
/// # Errors
///
/// - `InvalidLiquidityParameter` if `b <= 0`
/// - `ShareQuantityTooLarge` if a quantity exceeds [`MAX_SHARES`]
/// - `InvalidShareQuantity` if a quantity is negative
pub fn cost(q_yes: Fixed, q_no: Fixed, b: Fixed) -> Result<Fixed, PricingError> {
    let exps = Exponentials::new(q_yes, q_no, b)?;
    let log = exps.sum()?.ln()?;
    Ok(exps.shift.checked_add(b.checked_mul(log)?)?)
}

/// Instantaneous price of one share of `side`, in `[0, 1]`.
pub fn price(q_yes: Fixed, q_no: Fixed, b: Fixed, side: Side) -> Result<Fixed, PricingError> {
    let exps = Exponentials::new(q_yes, q_no, b)?;
    let numerator = match side {
        Side::Yes => exps.yes,
        Side::No => exps.no,
    };
    Ok(numerator.checked_div(exps.sum()?)?)
}

/// Both prices, checked to sum to one within [`PRICE_SUM_TOLERANCE`].
pub fn prices(q_yes: Fixed, q_no: Fixed, b: Fixed) -> Result<(Fixed, Fixed), PricingError> {
    let yes = price(q_yes, q_no, b, Side::Yes)?;
    let no = price(q_yes, q_no, b, Side::No)?;

    let sum = yes.checked_add(no)?;
    let drift = sum.checked_sub(Fixed::ONE)?;
    if drift > PRICE_SUM_TOLERANCE || drift < Fixed::ZERO.checked_sub(PRICE_SUM_TOLERANCE)? {
        return Err(MathError::PriceSumOutOfTolerance { sum }.into());
    }
    Ok((yes, no))
}

/// `C(q_yes + delta_yes, q_no + delta_no) - C(q_yes, q_no)`.
///
/// Trades are single-sided: at most one delta may be non-zero. Two zero
/// deltas cost exactly zero. Any other trade costs at least one raw unit, so
/// rounding never hands out shares for free.
pub fn cost_difference(
    q_yes: Fixed,
    q_no: Fixed,
    delta_yes: Fixed,
    delta_no: Fixed,
    b: Fixed,
) -> Result<Fixed, PricingError> {
    validate_liquidity(b)?;
    validate_quantity(q_yes)?;
    validate_quantity(q_no)?;

    if delta_yes.is_negative() || delta_no.is_negative() {
        return Err(ValidationError::InvalidShareQuantity {
            reason: "share deltas cannot be negative",
        }
        .into());
    }
    if !delta_yes.is_zero() && !delta_no.is_zero() {
        return Err(ValidationError::InvalidShareQuantity {
            reason: "a trade buys one side only",
        }
        .into());
    }
    if delta_yes.is_zero() && delta_no.is_zero() {
        return Ok(Fixed::ZERO);
    }

    let new_yes = q_yes.checked_add(delta_yes)?;
    let new_no = q_no.checked_add(delta_no)?;
    validate_quantity(new_yes)?;
    validate_quantity(new_no)?;

    let before = cost(q_yes, q_no, b)?;
    let after = cost(new_yes, new_no, b)?;
    Ok(after.checked_sub(before)?.max(MIN_TRADE_COST))
}

/// Cost of buying `delta` YES shares.
pub fn cost_to_buy_yes(
    q_yes: Fixed,
    q_no: Fixed,
    delta: Fixed,
    b: Fixed,
) -> Result<Fixed, PricingError> {
    cost_difference(q_yes, q_no, delta, Fixed::ZERO, b)
}

/// Cost of buying `delta` NO shares.
pub fn cost_to_buy_no(
    q_yes: Fixed,
    q_no: Fixed,
    delta: Fixed,
    b: Fixed,
) -> Result<Fixed, PricingError> {
    cost_difference(q_yes, q_no, Fixed::ZERO, delta, b)
}

/// Cost of buying `delta` shares of `side`.
pub fn purchase_cost(
    q_yes: Fixed,
    q_no: Fixed,
    side: Side,
    delta: Fixed,
    b: Fixed,
) -> Result<Fixed, PricingError> {
    match side {
        Side::Yes => cost_to_buy_yes(q_yes, q_no, delta, b),
        Side::No => cost_to_buy_no(q_yes, q_no, delta, b),
    }
}

/// Worst-case operator loss for liquidity `b`: `b * ln 2`.
pub fn max_operator_loss(b: Fixed) -> Result<Fixed, PricingError> {
    validate_liquidity(b)?;
    Ok(b.checked_mul(Fixed::LN_2)?)
}
