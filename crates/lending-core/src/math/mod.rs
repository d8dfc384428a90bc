//! # Mathematical Functions
//!
//! Fixed-point ledger primitives: checked integer arithmetic, 256-bit
//! `mul_div` with explicit rounding, and the 1e15-scaled [`Number`].

pub mod big_int;
pub mod fixed_point;
pub mod safe_math;

// Re-export commonly used functions
pub use big_int::*;
pub use fixed_point::*;
pub use safe_math::*;
