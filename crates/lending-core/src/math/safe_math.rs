//! # Safe Math Operations
//!
//! Overflow-checked arithmetic. Every failure maps to
//! [`LendingError::ArithmeticOverflow`] so that no operation ever commits a
//! wrapped value.

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{LendingError, LendingResult};
use crate::math::big_int::{mul_div, Rounding};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident) => {
        /// Checked binary operation returning `ArithmeticOverflow` on failure
        pub fn $fn_name(a: $type, b: $type) -> LendingResult<$type> {
            a.$checked_method(b).ok_or(LendingError::ArithmeticOverflow)
        }
    };

    // Simple cast with only max check
    (cast_max, $fn_name:ident, $from_type:ty, $to_type:ty, $max_val:expr) => {
        /// Checked narrowing cast
        pub fn $fn_name(value: $from_type) -> LendingResult<$to_type> {
            if value > $max_val {
                return Err(LendingError::ArithmeticOverflow);
            }
            Ok(value as $to_type)
        }
    };
}

safe_arith!(safe_add_u64, u64, checked_add);
safe_arith!(safe_sub_u64, u64, checked_sub);
safe_arith!(safe_mul_u64, u64, checked_mul);

safe_arith!(safe_add_u128, u128, checked_add);
safe_arith!(safe_sub_u128, u128, checked_sub);
safe_arith!(safe_mul_u128, u128, checked_mul);

safe_arith!(cast_max, safe_cast_u128_to_u64, u128, u64, u64::MAX as u128);

/// Apply a basis point fraction to a value
pub fn safe_calculate_bps(value: u128, bps: u64, rounding: Rounding) -> LendingResult<u128> {
    mul_div(value, bps as u128, BPS_DENOMINATOR as u128, rounding)
}

/// 10^exponent as u128
pub fn pow10(exponent: u32) -> LendingResult<u128> {
    10u128
        .checked_pow(exponent)
        .ok_or(LendingError::ArithmeticOverflow)
}
