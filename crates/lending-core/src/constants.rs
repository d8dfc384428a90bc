//! # Protocol Constants
//!
//! Fixed-point scales, basis point denominators and time constants shared by
//! the accounting engine.

// ============================================================================
// Fixed-Point Constants
// ============================================================================

/// Number of decimal places carried by [`crate::Number`]
pub const NUMBER_DECIMALS: u32 = 15;

/// Fixed-point scale factor for debt, fees, rates and prices (1e15)
pub const NUMBER_ONE: u128 = 1_000_000_000_000_000;

/// Basis points denominator (10,000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// One basis point expressed in the 1e15 scale
pub const NUMBER_PER_BPS: u128 = NUMBER_ONE / BPS_DENOMINATOR as u128;

/// Largest token decimals a reserve may declare
pub const MAX_TOKEN_DECIMALS: u8 = 18;

// ============================================================================
// Time Constants
// ============================================================================

/// Seconds in a (non-leap) year, the denominator of annual borrow rates
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Longest stretch of one accrual compounded per second; any remainder of a
/// longer gap accrues linearly on the compounded amount
pub const MAX_COMPOUNDING_INTERVAL_SECS: u64 = SECONDS_PER_YEAR;

/// Default oracle staleness tolerance in seconds
pub const DEFAULT_MAX_PRICE_AGE_SECS: u64 = 60;

// ============================================================================
// Validation Thresholds
// ============================================================================

/// Upper bound for annual borrow rates (1000% APR)
pub const MAX_BORROW_RATE_BPS: u64 = 100_000;

/// Lower bound for the minimum collateral ratio (100%)
pub const MIN_COLLATERAL_RATIO_FLOOR_BPS: u64 = BPS_DENOMINATOR;

/// Upper bound for the liquidation premium (50%)
pub const MAX_LIQUIDATION_PREMIUM_BPS: u64 = 5_000;

/// Upper bound for the loan origination fee (10%)
pub const MAX_LOAN_ORIGINATION_FEE_BPS: u64 = 1_000;
