//! # Obligation Health
//!
//! Collateralization is recomputed from scratch on every evaluation. Each
//! referenced reserve is read at its post-accrual exchange rate together
//! with a fresh oracle price; no ratio is cached on the obligation.
//!
//! ```text
//! collateral_value = Σ tokens(collateral_notes_i, down) × price_i
//! required_value   = Σ tokens(loan_notes_j, up) × price_j × min_collateral_ratio_j / 10000
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{LendingError, LendingResult};
use crate::math::{Number, Rounding};
use crate::state::{Obligation, Reserve};
use crate::types::ReserveId;

/// Source of accrued reserves and their current prices
pub trait PricedReserves {
    fn priced_reserve(&self, id: ReserveId) -> LendingResult<(&Reserve, Number)>;
}

/// Collateralization of an obligation, in quote currency at 1e15 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthReport {
    pub collateral_value: Number,
    pub loan_value: Number,
    pub required_value: Number,
}

impl HealthReport {
    pub fn evaluate(obligation: &Obligation, reserves: &impl PricedReserves) -> LendingResult<Self> {
        let mut report = HealthReport::default();

        for (id, notes) in obligation.collateral() {
            if notes == 0 {
                continue;
            }
            let (reserve, price) = reserves.priced_reserve(id)?;
            let tokens = reserve.deposit_notes_to_tokens(notes, Rounding::Down)?;
            let value = reserve.market_value(tokens, price, Rounding::Down)?;
            report.collateral_value = report.collateral_value.checked_add(value)?;
        }

        for (id, notes) in obligation.loans() {
            if notes == 0 {
                continue;
            }
            let (reserve, price) = reserves.priced_reserve(id)?;
            let tokens = reserve.loan_notes_to_tokens(notes)?;
            let value = reserve.market_value(tokens, price, Rounding::Up)?;
            let required = value.mul_ratio(
                reserve.config.min_collateral_ratio as u128,
                BPS_DENOMINATOR as u128,
                Rounding::Up,
            )?;
            report.loan_value = report.loan_value.checked_add(value)?;
            report.required_value = report.required_value.checked_add(required)?;
        }

        Ok(report)
    }

    pub fn is_healthy(&self) -> bool {
        self.collateral_value >= self.required_value
    }

    /// Collateral value over loan value in basis points, `None` without loans
    pub fn collateral_ratio_bps(&self) -> LendingResult<Option<u64>> {
        if self.loan_value.is_zero() {
            return Ok(None);
        }
        let ratio = self.collateral_value.div(self.loan_value, Rounding::Down)?;
        ratio.to_bps().map(Some)
    }

    pub fn ensure_healthy(&self) -> LendingResult<()> {
        if !self.is_healthy() {
            return Err(LendingError::InsufficientCollateral {
                collateral_value: self.collateral_value.to_scaled(),
                required_value: self.required_value.to_scaled(),
            });
        }
        Ok(())
    }
}
