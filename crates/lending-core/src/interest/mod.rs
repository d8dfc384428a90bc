//! # Interest Accrual
//!
//! Borrow rates follow a piecewise-linear curve over utilization with four
//! anchors: 0, `utilization_rate_1`, `utilization_rate_2` and 100%. Debt
//! compounds once per elapsed second at `rate / SECONDS_PER_YEAR`:
//!
//! ```text
//! growth = (1 + rate / SECONDS_PER_YEAR) ^ Δt - 1
//! ```
//!
//! whose first-order term is the linear `rate × Δt / SECONDS_PER_YEAR`. The
//! power is evaluated by square-and-multiply at 1e27 precision and tracks
//! continuous compounding to a few ulps.
//!
//! Compounding covers at most [`MAX_COMPOUNDING_INTERVAL_SECS`] of one
//! accrual. The rest of a longer idle gap grows the compounded amount
//! linearly, so the factor stays representable at every accepted rate:
//!
//! ```text
//! factor = (1 + rate / SECONDS_PER_YEAR) ^ min(Δt, H) × (1 + rate × (Δt - H)⁺ / SECONDS_PER_YEAR)
//! ```
//!
//! Accrued interest is added to the outstanding debt in full. The
//! `manage_fee_rate` share of it is also recorded in `uncollected_fees`,
//! which removes that share from the depositors' backing.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_COMPOUNDING_INTERVAL_SECS, NUMBER_PER_BPS, SECONDS_PER_YEAR};
use crate::errors::{LendingError, LendingResult};
use crate::math::{mul_div, safe_add_u128, safe_calculate_bps, Number, Rounding};
use crate::state::ReserveState;
use crate::types::ReserveConfig;

/// Working precision of the compounding power (1e27)
const WIDE_ONE: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Ratio between the wide scale and [`Number`] scale
const WIDE_PER_NUMBER: u128 = 1_000_000_000_000;

/// What one accrual step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccrualOutcome {
    /// Seconds accrued
    pub elapsed: u64,
    /// Annual borrow rate applied
    pub borrow_rate: Number,
    /// Interest added to outstanding debt
    pub interest: Number,
    /// Protocol share of `interest`
    pub fee: Number,
}

// ============================================================================
// Rate Curve
// ============================================================================

/// `debt / (debt + available liquidity)`, clamped to 1
pub fn utilization(state: &ReserveState) -> LendingResult<Number> {
    let debt = state.outstanding_debt;
    if debt.is_zero() {
        return Ok(Number::ZERO);
    }

    let total = debt.checked_add(Number::from_tokens(state.total_deposits)?)?;
    let ratio = debt.div(total, Rounding::Down)?;
    Ok(ratio.min(Number::ONE))
}

/// Annual borrow rate at `utilization`
pub fn borrow_rate(config: &ReserveConfig, utilization: Number) -> LendingResult<Number> {
    let utilization = utilization.min(Number::ONE);
    let anchors = config.utilization_anchors();
    let rates = config.borrow_rates();

    let segment = (0..3)
        .find(|&i| utilization <= anchor_number(anchors[i + 1]))
        .unwrap_or(2);

    let start_u = anchor_number(anchors[segment]);
    let end_u = anchor_number(anchors[segment + 1]);
    let start_rate = Number::from_bps(rates[segment])?;
    let end_rate = Number::from_bps(rates[segment + 1])?;

    let span = end_u.checked_sub(start_u)?;
    if span.is_zero() {
        return Ok(start_rate);
    }
    let progress = utilization.saturating_sub(start_u);

    if end_rate >= start_rate {
        let step = end_rate
            .checked_sub(start_rate)?
            .mul_ratio(progress.to_scaled(), span.to_scaled(), Rounding::Down)?;
        start_rate.checked_add(step)
    } else {
        let step = start_rate
            .checked_sub(end_rate)?
            .mul_ratio(progress.to_scaled(), span.to_scaled(), Rounding::Up)?;
        start_rate.checked_sub(step)
    }
}

fn anchor_number(bps: u64) -> Number {
    Number::from_scaled(bps as u128 * NUMBER_PER_BPS)
}

// ============================================================================
// Compounding
// ============================================================================

/// `(1 + rate / SECONDS_PER_YEAR) ^ seconds` at 1e27 scale
fn compound_factor_wide(annual_rate: Number, seconds: u64) -> LendingResult<u128> {
    let per_second = mul_div(
        annual_rate.to_scaled(),
        WIDE_PER_NUMBER,
        SECONDS_PER_YEAR as u128,
        Rounding::Down,
    )?;

    let mut base = safe_add_u128(WIDE_ONE, per_second)?;
    let mut result = WIDE_ONE;
    let mut exponent = seconds;

    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_div(result, base, WIDE_ONE, Rounding::Down)?;
        }
        exponent >>= 1;
        if exponent > 0 {
            base = mul_div(base, base, WIDE_ONE, Rounding::Down)?;
        }
    }

    Ok(result)
}

/// Growth factor over `seconds` at 1e27 scale, compounding at most
/// [`MAX_COMPOUNDING_INTERVAL_SECS`] and growing linearly past it
fn growth_factor_wide(annual_rate: Number, seconds: u64) -> LendingResult<u128> {
    let compounded = seconds.min(MAX_COMPOUNDING_INTERVAL_SECS);
    let factor = compound_factor_wide(annual_rate, compounded)?;

    let remainder = seconds - compounded;
    if remainder == 0 {
        return Ok(factor);
    }

    let linear = mul_div(
        annual_rate.to_scaled(),
        WIDE_PER_NUMBER * remainder as u128,
        SECONDS_PER_YEAR as u128,
        Rounding::Down,
    )?;
    mul_div(factor, safe_add_u128(WIDE_ONE, linear)?, WIDE_ONE, Rounding::Down)
}

/// Growth of one unit of debt over `seconds` at `annual_rate`, minus the unit
pub fn compound_growth(annual_rate: Number, seconds: u64) -> LendingResult<Number> {
    let factor = growth_factor_wide(annual_rate, seconds)?;
    let growth = factor
        .checked_sub(WIDE_ONE)
        .ok_or(LendingError::ArithmeticOverflow)?;
    Ok(Number::from_scaled(growth.div_ceil(WIDE_PER_NUMBER)))
}

/// Interest accrued by `debt` over `seconds`, rounded up
pub fn interest_for(debt: Number, annual_rate: Number, seconds: u64) -> LendingResult<Number> {
    if debt.is_zero() || annual_rate.is_zero() || seconds == 0 {
        return Ok(Number::ZERO);
    }
    let factor = growth_factor_wide(annual_rate, seconds)?;
    let growth = factor
        .checked_sub(WIDE_ONE)
        .ok_or(LendingError::ArithmeticOverflow)?;
    mul_div(debt.to_scaled(), growth, WIDE_ONE, Rounding::Up).map(Number::from_scaled)
}

// ============================================================================
// Accrual
// ============================================================================

/// Accrue `state` up to `now`
///
/// A no-op when `now` is not past `accrued_until`. The rate is taken from
/// utilization at the start of the interval.
pub fn accrue(config: &ReserveConfig, state: &mut ReserveState, now: u64) -> LendingResult<AccrualOutcome> {
    if now <= state.accrued_until {
        return Ok(AccrualOutcome::default());
    }

    let elapsed = now - state.accrued_until;
    let rate = borrow_rate(config, utilization(state)?)?;
    let interest = interest_for(state.outstanding_debt, rate, elapsed)?;
    let fee = Number::from_scaled(safe_calculate_bps(
        interest.to_scaled(),
        config.manage_fee_rate,
        Rounding::Down,
    )?);

    state.outstanding_debt = state.outstanding_debt.checked_add(interest)?;
    state.uncollected_fees = state.uncollected_fees.checked_add(fee)?;
    state.accrued_until = now;

    Ok(AccrualOutcome {
        elapsed,
        borrow_rate: rate,
        interest,
        fee,
    })
}
