//! # Fixed-Point Arithmetic
//!
//! `Number` is an unsigned decimal fixed-point value with 15 fractional
//! digits. Debt, fee accumulators, rates and prices all use this scale so that
//! sub-unit interest survives between accruals. No floating point is involved
//! in any conserved-value computation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{NUMBER_DECIMALS, NUMBER_ONE, NUMBER_PER_BPS};
use crate::errors::{LendingError, LendingResult};
use crate::math::big_int::{div_round, mul_div, Rounding};
use crate::math::safe_math::{safe_add_u128, safe_cast_u128_to_u64, safe_mul_u128, safe_sub_u128};

/// Decimal fixed-point number scaled by 1e15
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number(u128);

impl Number {
    pub const ZERO: Number = Number(0);
    pub const ONE: Number = Number(NUMBER_ONE);

    /// Wrap an already-scaled value
    pub const fn from_scaled(raw: u128) -> Self {
        Self(raw)
    }

    /// The underlying scaled value
    pub const fn to_scaled(self) -> u128 {
        self.0
    }

    /// Convert a whole token amount
    pub fn from_tokens(tokens: u64) -> LendingResult<Self> {
        safe_mul_u128(tokens as u128, NUMBER_ONE).map(Self)
    }

    /// Convert basis points (10,000 = 1.0)
    pub fn from_bps(bps: u64) -> LendingResult<Self> {
        safe_mul_u128(bps as u128, NUMBER_PER_BPS).map(Self)
    }

    /// Convert to whole tokens with explicit rounding
    pub fn to_tokens(self, rounding: Rounding) -> LendingResult<u64> {
        let tokens = div_round(self.0, NUMBER_ONE, rounding)?;
        safe_cast_u128_to_u64(tokens)
    }

    /// Convert to basis points, rounding down
    pub fn to_bps(self) -> LendingResult<u64> {
        safe_cast_u128_to_u64(self.0 / NUMBER_PER_BPS)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Number) -> LendingResult<Number> {
        safe_add_u128(self.0, other.0).map(Self)
    }

    pub fn checked_sub(self, other: Number) -> LendingResult<Number> {
        safe_sub_u128(self.0, other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Number) -> Number {
        Self(self.0.saturating_sub(other.0))
    }

    /// Fixed-point product
    pub fn mul(self, other: Number, rounding: Rounding) -> LendingResult<Number> {
        mul_div(self.0, other.0, NUMBER_ONE, rounding).map(Self)
    }

    /// Fixed-point quotient
    pub fn div(self, other: Number, rounding: Rounding) -> LendingResult<Number> {
        if other.0 == 0 {
            return Err(LendingError::ArithmeticOverflow);
        }
        mul_div(self.0, NUMBER_ONE, other.0, rounding).map(Self)
    }

    /// Multiply by an integer
    pub fn mul_int(self, factor: u128) -> LendingResult<Number> {
        safe_mul_u128(self.0, factor).map(Self)
    }

    /// Multiply by `numerator / denominator`
    pub fn mul_ratio(self, numerator: u128, denominator: u128, rounding: Rounding) -> LendingResult<Number> {
        mul_div(self.0, numerator, denominator, rounding).map(Self)
    }

    /// Lossy conversion for reporting and tests
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / NUMBER_ONE as f64
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / NUMBER_ONE,
            self.0 % NUMBER_ONE,
            width = NUMBER_DECIMALS as usize
        )
    }
}
