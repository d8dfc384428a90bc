//! # Reserve State
//!
//! A reserve is the pool of one asset inside a market. Liquidity held in the
//! vault is tracked in whole tokens (`total_deposits`); outstanding debt and
//! the protocol fee accumulator are tracked as [`Number`] so interest below
//! one token survives between accruals.
//!
//! The depositors' claim on the reserve ("backing") is
//!
//! ```text
//! backing = total_deposits + outstanding_debt - uncollected_fees
//! ```
//!
//! and every deposit note is worth `backing / total_deposit_notes` tokens.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{MAX_TOKEN_DECIMALS, NUMBER_ONE};
use crate::errors::{LendingError, LendingResult};
use crate::interest::{self, AccrualOutcome};
use crate::math::{mul_div, pow10, safe_add_u64, safe_mul_u128, Number, Rounding};
use crate::types::{Address, ReserveConfig, ReserveId};

/// Mutable accounting state of a reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReserveState {
    /// Tokens held in the reserve vault
    pub total_deposits: u64,
    pub total_deposit_notes: u64,
    /// Debt owed by all borrowers including accrued interest
    pub outstanding_debt: Number,
    pub total_loan_notes: u64,
    /// Protocol revenue not yet converted to deposit notes
    pub uncollected_fees: Number,
    /// Deposit notes owned by the protocol
    pub fee_note_balance: u64,
    /// Timestamp interest has been accrued to
    pub accrued_until: u64,
    /// Timestamp of the last committed mutation
    pub last_updated: u64,
    /// Set when a refresh observed an unusable price
    pub invalidated: bool,
}

/// Pool of one asset within a market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub id: ReserveId,
    pub market: Address,
    pub mint: Address,
    pub vault: Address,
    pub oracle: Address,
    pub decimals: u8,
    pub config: ReserveConfig,
    pub state: ReserveState,
}

/// Result of a fee sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSweep {
    pub fee_tokens: u64,
    pub notes_minted: u64,
}

impl Reserve {
    /// Create an empty reserve accruing from `now`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ReserveId,
        market: Address,
        mint: Address,
        vault: Address,
        oracle: Address,
        decimals: u8,
        config: ReserveConfig,
        now: u64,
    ) -> LendingResult<Self> {
        config.validate()?;
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(LendingError::invalid_config("decimals", "must be at most 18"));
        }

        Ok(Self {
            id,
            market,
            mint,
            vault,
            oracle,
            decimals,
            config,
            state: ReserveState {
                accrued_until: now,
                last_updated: now,
                ..ReserveState::default()
            },
        })
    }

    // ========================================================================
    // Interest
    // ========================================================================

    /// Accrue interest up to `now` under the current configuration
    pub fn accrue(&mut self, now: u64) -> LendingResult<AccrualOutcome> {
        let outcome = interest::accrue(&self.config, &mut self.state, now)?;
        if outcome.elapsed > 0 {
            debug!(
                reserve = %self.id,
                elapsed = outcome.elapsed,
                rate = %outcome.borrow_rate,
                interest = %outcome.interest,
                fee = %outcome.fee,
                "accrued interest"
            );
        }
        Ok(outcome)
    }

    /// Current utilization of the reserve
    pub fn utilization(&self) -> LendingResult<Number> {
        interest::utilization(&self.state)
    }

    /// Convert whole uncollected fee tokens into protocol-owned deposit notes
    ///
    /// Notes are minted at the pre-sweep exchange rate, rounded down, so the
    /// deposit-note rate never decreases. The sub-token remainder stays in
    /// `uncollected_fees`.
    pub fn sweep_fees(&mut self) -> LendingResult<FeeSweep> {
        let fee_tokens = self.state.uncollected_fees.to_tokens(Rounding::Down)?;
        if fee_tokens == 0 || fee_tokens < self.config.manage_fee_collection_threshold {
            return Ok(FeeSweep::default());
        }

        let notes_minted = self.deposit_notes_for_tokens(fee_tokens, Rounding::Down)?;
        self.state.uncollected_fees = self
            .state
            .uncollected_fees
            .checked_sub(Number::from_tokens(fee_tokens)?)?;
        self.state.total_deposit_notes = safe_add_u64(self.state.total_deposit_notes, notes_minted)?;
        self.state.fee_note_balance = safe_add_u64(self.state.fee_note_balance, notes_minted)?;

        info!(reserve = %self.id, fee_tokens, notes_minted, "swept protocol fees");
        Ok(FeeSweep {
            fee_tokens,
            notes_minted,
        })
    }

    // ========================================================================
    // Valuation
    // ========================================================================

    /// Depositors' claim on the reserve, in tokens at 1e15 scale
    pub fn deposit_backing(&self) -> LendingResult<Number> {
        Number::from_tokens(self.state.total_deposits)?
            .checked_add(self.state.outstanding_debt)?
            .checked_sub(self.state.uncollected_fees)
    }

    /// Quote-currency value of `tokens` at `price` per whole token
    pub fn market_value(&self, tokens: u64, price: Number, rounding: Rounding) -> LendingResult<Number> {
        let unit = pow10(self.decimals as u32)?;
        mul_div(tokens as u128, price.to_scaled(), unit, rounding).map(Number::from_scaled)
    }

    /// Tokens worth `value` in the quote currency at `price`
    pub fn tokens_for_value(&self, value: Number, price: Number, rounding: Rounding) -> LendingResult<u64> {
        if price.is_zero() {
            return Err(LendingError::ArithmeticOverflow);
        }
        let unit = pow10(self.decimals as u32)?;
        let tokens = mul_div(value.to_scaled(), unit, price.to_scaled(), rounding)?;
        u64::try_from(tokens).map_err(|_| LendingError::ArithmeticOverflow)
    }

    pub fn snapshot(&self) -> LendingResult<ReserveSnapshot> {
        Ok(ReserveSnapshot {
            reserve: self.id,
            accrued_until: self.state.accrued_until,
            last_updated: self.state.last_updated,
            outstanding_debt: self.state.outstanding_debt,
            total_deposits: self.state.total_deposits,
            total_deposit_notes: self.state.total_deposit_notes,
            total_loan_notes: self.state.total_loan_notes,
            uncollected_fees: self.state.uncollected_fees,
            fee_note_balance: self.state.fee_note_balance,
            invalidated: self.state.invalidated,
            deposit_note_rate: self.deposit_note_rate()?,
            loan_note_rate: self.loan_note_rate()?,
            utilization: self.utilization()?,
        })
    }
}

/// Serializable view of a reserve after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSnapshot {
    pub reserve: ReserveId,
    pub accrued_until: u64,
    pub last_updated: u64,
    pub outstanding_debt: Number,
    pub total_deposits: u64,
    pub total_deposit_notes: u64,
    pub total_loan_notes: u64,
    pub uncollected_fees: Number,
    pub fee_note_balance: u64,
    pub invalidated: bool,
    pub deposit_note_rate: Number,
    pub loan_note_rate: Number,
    pub utilization: Number,
}

impl ReserveSnapshot {
    /// Outstanding debt in whole tokens, rounded up
    pub fn debt_tokens(&self) -> LendingResult<u64> {
        self.outstanding_debt.to_tokens(Rounding::Up)
    }
}

/// Scale a token count to [`Number`] precision as a u128
pub(crate) fn scaled_tokens(tokens: u64) -> LendingResult<u128> {
    safe_mul_u128(tokens as u128, NUMBER_ONE)
}
