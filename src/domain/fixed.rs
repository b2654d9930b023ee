//! Deterministic 18-decimal fixed-point numbers with `exp` and `ln`.
//!
//! [`Fixed`] wraps an `i128` holding `value * 10^18`. Every operation is
//! integer-only, so results are bit-identical across platforms. Products and
//! quotients go through a 256-bit intermediate and fail with
//! [`MathError::Overflow`] instead of wrapping.
//!
//! `exp` is defined on `[MIN_EXP, MAX_EXP]` and `ln` on strictly positive
//! inputs. Both are monotone; `exp` keeps a relative error below `1e-15` for
//! results above `1e-5`, `ln` an absolute error below `1e-16`.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::error::MathError;

/// Number of fractional decimal digits.
pub const DECIMALS: u32 = 18;

/// Raw representation of `1.0`.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// `ln(2)` truncated to 18 decimals.
const LN_2_RAW: i128 = 693_147_180_559_945_309;

/// `10^36`, the working scale of `exp`.
const WIDE_SCALE: i128 = SCALE * SCALE;

/// `ln(2)` truncated to 36 decimals.
const LN_2_WIDE: i128 = 693_147_180_559_945_309_417_232_121_458_176_568;

/// A signed fixed-point number with 18 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i128);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);
    pub const LN_2: Fixed = Fixed(LN_2_RAW);

    /// Smallest accepted `exp` argument. `e^-42` is already below one raw unit.
    pub const MIN_EXP: Fixed = Fixed(-42 * SCALE);

    /// Largest accepted `exp` argument.
    pub const MAX_EXP: Fixed = Fixed(42 * SCALE);

    /// Largest representable value.
    pub const MAX: Fixed = Fixed(i128::MAX);

    /// Wrap a raw `value * 10^18` integer.
    #[must_use]
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// The raw `value * 10^18` integer.
    #[must_use]
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Whole number to fixed point. Every `i64` fits.
    #[must_use]
    pub const fn from_int(n: i64) -> Self {
        Self(n as i128 * SCALE)
    }

    /// Exact conversion from a decimal; digits beyond the 18th are truncated.
    pub fn from_decimal(value: Decimal) -> Result<Self, MathError> {
        let mantissa = value.mantissa();
        let scale = value.scale();
        let raw = if scale <= DECIMALS {
            mantissa
                .checked_mul(10_i128.pow(DECIMALS - scale))
                .ok_or(MathError::Overflow)?
        } else {
            mantissa / 10_i128.pow(scale - DECIMALS)
        };
        Ok(Self(raw))
    }

    /// Convert to a normalized decimal, if it fits `Decimal`'s 96-bit mantissa.
    #[must_use]
    pub fn to_decimal(self) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(self.0, DECIMALS)
            .ok()
            .map(|d| d.normalize())
    }

    /// Interpret a collateral amount in base units as a fixed-point value.
    pub fn from_amount(amount: u128) -> Result<Self, MathError> {
        i128::try_from(amount)
            .map(Self)
            .map_err(|_| MathError::Overflow)
    }

    /// Collateral base units for a non-negative value.
    ///
    /// Fails with [`MathError::Overflow`] for negative values.
    pub fn to_amount(self) -> Result<u128, MathError> {
        u128::try_from(self.0).map_err(|_| MathError::Overflow)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, MathError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, MathError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    /// `self * rhs`, truncated toward zero.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, MathError> {
        mul_div(self.0, rhs.0, SCALE).map(Self)
    }

    /// `self / rhs`, truncated toward zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self, MathError> {
        mul_div(self.0, SCALE, rhs.0).map(Self)
    }

    /// `e^self` for `self` in `[MIN_EXP, MAX_EXP]`.
    ///
    /// Works at 36 decimals: splits `x = k*ln2 + r` with `k = floor(x / ln2)`
    /// and `r` in `[0, ln2)`, sums the Taylor series of `e^r` until terms
    /// vanish, then scales by `2^k` and truncates back to 18 decimals. The
    /// working error stays far below one step of the input, so the truncated
    /// result never decreases as `x` grows.
    pub fn exp(self) -> Result<Self, MathError> {
        if self < Self::MIN_EXP || self > Self::MAX_EXP {
            return Err(MathError::ExpOutOfDomain { x: self });
        }

        // |x| <= 42 * 10^36 fits i128.
        let x = self.0 * SCALE;
        let k = x.div_euclid(LN_2_WIDE);
        let r = U256::from(x.rem_euclid(LN_2_WIDE).unsigned_abs());

        let wide = U256::from(WIDE_SCALE.unsigned_abs());
        let mut term = wide;
        let mut sum = wide;
        let mut n: u64 = 1;
        while !term.is_zero() {
            term = term * r / (U256::from(n) * wide);
            sum += term;
            n += 1;
        }

        // k is within [-61, 60] for the accepted domain.
        let shift = k.unsigned_abs() as usize;
        let narrow = U256::from(SCALE.unsigned_abs());
        let value = if k >= 0 {
            (sum << shift) / narrow
        } else {
            sum / (narrow << shift)
        };
        let value = u128::try_from(value).map_err(|_| MathError::Overflow)?;
        i128::try_from(value)
            .map(Self)
            .map_err(|_| MathError::Overflow)
    }

    /// Natural logarithm of a strictly positive value.
    ///
    /// Normalizes `x = m * 2^k` with `m` in `[1, 2)`, then evaluates
    /// `ln m = 2 * atanh((m - 1) / (m + 1))` by its odd power series.
    pub fn ln(self) -> Result<Self, MathError> {
        if self.0 <= 0 {
            return Err(MathError::LogOfNonPositive { x: self });
        }

        let mut m = self.0;
        let mut k: i128 = 0;
        if m >= 2 * SCALE {
            let whole = m / SCALE;
            let shift = 127 - whole.leading_zeros();
            m >>= shift;
            k = i128::from(shift);
        }
        while m < SCALE {
            m <<= 1;
            k -= 1;
        }

        let z = (m - SCALE) * SCALE / (m + SCALE);
        let z2 = z * z / SCALE;
        let mut term = z;
        let mut sum: i128 = 0;
        let mut n: i128 = 1;
        while term != 0 {
            sum += term / n;
            term = term * z2 / SCALE;
            n += 2;
        }

        let log2_part = k.checked_mul(LN_2_RAW).ok_or(MathError::Overflow)?;
        log2_part
            .checked_add(2 * sum)
            .map(Self)
            .ok_or(MathError::Overflow)
    }
}

/// `a * b / denom` with a 256-bit intermediate, truncated toward zero.
fn mul_div(a: i128, b: i128, denom: i128) -> Result<i128, MathError> {
    if denom == 0 {
        return Err(MathError::DivisionByZero);
    }
    let negative = (a < 0) ^ (b < 0) ^ (denom < 0);

    let product = U256::from(a.unsigned_abs())
        .checked_mul(U256::from(b.unsigned_abs()))
        .ok_or(MathError::Overflow)?;
    let quotient = product
        .checked_div(U256::from(denom.unsigned_abs()))
        .ok_or(MathError::DivisionByZero)?;

    let magnitude = u128::try_from(quotient).map_err(|_| MathError::Overflow)?;
    let magnitude = i128::try_from(magnitude).map_err(|_| MathError::Overflow)?;
    Ok(if negative { -magnitude } else { magnitude })
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        let whole = magnitude / scale;
        let fraction = magnitude % scale;
        if fraction == 0 {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!("{fraction:018}");
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// A string that is not a decimal number in range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid fixed-point value '{input}'")]
pub struct ParseFixedError {
    input: String,
}

impl FromStr for Fixed {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseFixedError {
            input: s.to_string(),
        };
        let decimal = Decimal::from_str(s.trim()).map_err(|_| invalid())?;
        Self::from_decimal(decimal).map_err(|_| invalid())
    }
}

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let decimal = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(decimal).map_err(serde::de::Error::custom)
    }
}
