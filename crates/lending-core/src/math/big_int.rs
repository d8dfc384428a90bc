//! Big integer operations for high-precision math
//!
//! This module provides the U256 intermediate and the `mul_div` family
//! that every note conversion and value computation goes through.

use crate::errors::{LendingError, LendingResult};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// 256-bit unsigned integer for intermediate calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256 {
    /// Low 128 bits
    pub lo: u128,
    /// High 128 bits
    pub hi: u128,
}

impl U256 {
    pub const ZERO: U256 = U256 { lo: 0, hi: 0 };

    /// Create a new U256 from low and high parts
    pub const fn new(lo: u128, hi: u128) -> Self {
        Self { lo, hi }
    }

    /// Create from a single u128 value
    pub const fn from_u128(value: u128) -> Self {
        Self { lo: value, hi: 0 }
    }

    /// Check if the value is zero
    pub const fn is_zero(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Convert to u128, returning None if overflow
    pub fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Add two U256 values
    pub fn checked_add(&self, other: &U256) -> Option<U256> {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        let hi = self.hi.checked_add(other.hi)?.checked_add(carry as u128)?;
        Some(U256::new(lo, hi))
    }

    fn bit(&self, index: u32) -> bool {
        if index < 128 {
            (self.lo >> index) & 1 == 1
        } else {
            (self.hi >> (index - 128)) & 1 == 1
        }
    }

    fn set_bit(&mut self, index: u32) {
        if index < 128 {
            self.lo |= 1u128 << index;
        } else {
            self.hi |= 1u128 << (index - 128);
        }
    }

    /// Divide by a u128 divisor, returning quotient and remainder
    pub fn div_rem_u128(&self, divisor: u128) -> Option<(U256, u128)> {
        if divisor == 0 {
            return None;
        }

        if self.hi == 0 {
            return Some((U256::from_u128(self.lo / divisor), self.lo % divisor));
        }

        // Restoring long division, one bit at a time. The remainder stays
        // below the divisor, so a shifted-out top bit means it exceeded it.
        let mut quotient = U256::ZERO;
        let mut remainder: u128 = 0;
        for index in (0..256).rev() {
            let carry = remainder >> 127;
            remainder = (remainder << 1) | (self.bit(index) as u128);
            if carry == 1 || remainder >= divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient.set_bit(index);
            }
        }

        Some((quotient, remainder))
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.hi.cmp(&other.hi) {
            std::cmp::Ordering::Equal => self.lo.cmp(&other.lo),
            ordering => ordering,
        }
    }
}

/// Multiply two u128 values and return as U256
pub fn mul_u128_to_u256(a: u128, b: u128) -> U256 {
    const MASK: u128 = u64::MAX as u128;

    let a_lo = a & MASK;
    let a_hi = a >> 64;
    let b_lo = b & MASK;
    let b_hi = b >> 64;

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // At most 3 * (2^64 - 1), so the middle column cannot overflow
    let mid = (lo_lo >> 64) + (lo_hi & MASK) + (hi_lo & MASK);

    let lo = (lo_lo & MASK) | (mid << 64);
    let hi = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (mid >> 64);

    U256::new(lo, hi)
}

/// Multiply two u128 values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> LendingResult<u128> {
    if denominator == 0 {
        return Err(LendingError::ArithmeticOverflow);
    }

    let product = mul_u128_to_u256(a, b);
    let (quotient, remainder) = product
        .div_rem_u128(denominator)
        .ok_or(LendingError::ArithmeticOverflow)?;

    let mut result = quotient.to_u128().ok_or(LendingError::ArithmeticOverflow)?;
    if rounding == Rounding::Up && remainder > 0 {
        result = result.checked_add(1).ok_or(LendingError::ArithmeticOverflow)?;
    }

    Ok(result)
}

/// Divide with specified rounding
pub fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> LendingResult<u128> {
    if denominator == 0 {
        return Err(LendingError::ArithmeticOverflow);
    }

    let quotient = numerator / denominator;
    if rounding == Rounding::Up && numerator % denominator != 0 {
        return quotient.checked_add(1).ok_or(LendingError::ArithmeticOverflow);
    }
    Ok(quotient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_widening_mul() {
        let product = mul_u128_to_u256(u128::MAX, u128::MAX);
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        assert_eq!(product.lo, 1);
        assert_eq!(product.hi, u128::MAX - 1);

        let product = mul_u128_to_u256(1u128 << 64, 1u128 << 64);
        assert_eq!(product, U256::new(0, 1));
    }

    #[test]
    fn test_div_rem_large_dividend() {
        let product = mul_u128_to_u256(u128::MAX, 3);
        let (quotient, remainder) = product.div_rem_u128(3).unwrap();
        assert_eq!(quotient.to_u128(), Some(u128::MAX));
        assert_eq!(remainder, 0);

        let (quotient, remainder) = product.div_rem_u128(u128::MAX).unwrap();
        assert_eq!(quotient.to_u128(), Some(3));
        assert_eq!(remainder, 0);
    }

    #[test]
    fn test_mul_div_rounding() {
        // 30 / 4 = 7.5
        assert_eq!(mul_div(10, 3, 4, Rounding::Down).unwrap(), 7);
        assert_eq!(mul_div(10, 3, 4, Rounding::Up).unwrap(), 8);

        // Exact division never rounds up
        assert_eq!(mul_div(10, 4, 5, Rounding::Up).unwrap(), 8);
    }

    #[test]
    fn test_mul_div_large_numbers() {
        let a = u128::MAX / 2;
        assert_eq!(mul_div(a, 2, 2, Rounding::Down).unwrap(), a);

        let scaled = 1_000_000_000_000_000u128;
        assert_eq!(
            mul_div(u64::MAX as u128 * scaled, scaled, scaled, Rounding::Down).unwrap(),
            u64::MAX as u128 * scaled
        );
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), Err(LendingError::ArithmeticOverflow));
        assert_eq!(
            mul_div(u128::MAX, u128::MAX, 1, Rounding::Down),
            Err(LendingError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_div_round() {
        assert_eq!(div_round(7, 2, Rounding::Down).unwrap(), 3);
        assert_eq!(div_round(7, 2, Rounding::Up).unwrap(), 4);
        assert_eq!(div_round(8, 2, Rounding::Up).unwrap(), 4);
        assert!(div_round(1, 0, Rounding::Up).is_err());
    }
}
