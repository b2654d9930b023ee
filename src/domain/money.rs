//! Collateral amounts and fee arithmetic.

use alloy_primitives::U256;

use super::error::MathError;
use super::fixed::Fixed;

/// Collateral in base units; `10^18` base units make one token.
pub type Amount = u128;

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Platform fee charged on every trade: 150 bp = 1.5%.
pub const DEFAULT_FEE_BPS: u32 = 150;

/// `floor(cost * fee_bps / 10000)`.
pub fn fee_for(cost: Amount, fee_bps: u32) -> Result<Amount, MathError> {
    mul_div(cost, Amount::from(fee_bps), Amount::from(BPS_DENOMINATOR))
}

/// Render base units as whole tokens, e.g. `1.5` for `1.5 * 10^18`.
#[must_use]
pub fn format_tokens(amount: Amount) -> String {
    Fixed::from_amount(amount).map_or_else(|_| format!("{amount} base units"), |f| f.to_string())
}

/// `floor(a * b / denom)` with a 256-bit intermediate.
pub fn mul_div(a: Amount, b: Amount, denom: Amount) -> Result<Amount, MathError> {
    if denom == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(MathError::Overflow)?;
    let quotient = product
        .checked_div(U256::from(denom))
        .ok_or(MathError::DivisionByZero)?;
    Amount::try_from(quotient).map_err(|_| MathError::Overflow)
}
