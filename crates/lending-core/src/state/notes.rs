//! # Note Accounting
//!
//! Conversions between tokens and the two note kinds of a reserve.
//!
//! Deposit notes are claims on the reserve's backing; loan notes are claims
//! on its outstanding debt. When a note supply (or what it claims) is zero
//! the exchange rate is 1:1. Every conversion takes an explicit [`Rounding`]
//! and callers pick the direction that favors the pool:
//!
//! | conversion                               | rounding |
//! |------------------------------------------|----------|
//! | deposit notes minted for tokens          | down     |
//! | tokens charged for requested notes       | up       |
//! | tokens paid for redeemed notes           | down     |
//! | notes burned for a token withdrawal      | up       |
//! | loan notes minted for new debt           | up       |
//! | tokens owed for repaid loan notes        | up       |

use crate::constants::NUMBER_ONE;
use crate::errors::{LendingError, LendingResult};
use crate::math::{div_round, mul_div, safe_mul_u128, Number, Rounding};
use crate::state::reserve::{scaled_tokens, Reserve};
use crate::types::Amount;

impl Reserve {
    /// Tokens per deposit note
    pub fn deposit_note_rate(&self) -> LendingResult<Number> {
        let backing = self.deposit_backing()?;
        let notes = self.state.total_deposit_notes;
        if notes == 0 || backing.is_zero() {
            return Ok(Number::ONE);
        }
        Ok(Number::from_scaled(backing.to_scaled() / notes as u128))
    }

    /// Debt (1e15 scale) per loan note
    pub fn loan_note_rate(&self) -> LendingResult<Number> {
        let notes = self.state.total_loan_notes;
        let debt = self.state.outstanding_debt;
        if notes == 0 || debt.is_zero() {
            return Ok(Number::ONE);
        }
        Ok(Number::from_scaled(debt.to_scaled() / notes as u128))
    }

    // ========================================================================
    // Deposit Notes
    // ========================================================================

    /// Deposit notes worth `tokens`
    pub fn deposit_notes_for_tokens(&self, tokens: u64, rounding: Rounding) -> LendingResult<u64> {
        let backing = self.deposit_backing()?;
        let notes = self.state.total_deposit_notes;
        if notes == 0 || backing.is_zero() {
            return Ok(tokens);
        }

        let minted = mul_div(
            scaled_tokens(tokens)?,
            notes as u128,
            backing.to_scaled(),
            rounding,
        )?;
        u64::try_from(minted).map_err(|_| LendingError::ArithmeticOverflow)
    }

    /// Tokens represented by `notes` deposit notes
    pub fn deposit_notes_to_tokens(&self, notes: u64, rounding: Rounding) -> LendingResult<u64> {
        let backing = self.deposit_backing()?;
        let supply = self.state.total_deposit_notes;
        if supply == 0 || backing.is_zero() {
            return Ok(notes);
        }

        let tokens = mul_div(
            notes as u128,
            backing.to_scaled(),
            safe_mul_u128(supply as u128, NUMBER_ONE)?,
            rounding,
        )?;
        u64::try_from(tokens).map_err(|_| LendingError::ArithmeticOverflow)
    }

    // ========================================================================
    // Loan Notes
    // ========================================================================

    /// Loan notes representing `debt`
    pub fn loan_notes_for_debt(&self, debt: Number, rounding: Rounding) -> LendingResult<u64> {
        let notes = self.state.total_loan_notes;
        let outstanding = self.state.outstanding_debt;
        let minted = if notes == 0 || outstanding.is_zero() {
            div_round(debt.to_scaled(), NUMBER_ONE, rounding)?
        } else {
            mul_div(debt.to_scaled(), notes as u128, outstanding.to_scaled(), rounding)?
        };
        u64::try_from(minted).map_err(|_| LendingError::ArithmeticOverflow)
    }

    /// Debt represented by `notes` loan notes
    pub fn debt_for_loan_notes(&self, notes: u64, rounding: Rounding) -> LendingResult<Number> {
        let supply = self.state.total_loan_notes;
        let outstanding = self.state.outstanding_debt;
        if supply == 0 || outstanding.is_zero() {
            return Number::from_tokens(notes);
        }
        mul_div(notes as u128, outstanding.to_scaled(), supply as u128, rounding).map(Number::from_scaled)
    }

    /// Whole tokens owed to retire `notes` loan notes, rounded up
    pub fn loan_notes_to_tokens(&self, notes: u64) -> LendingResult<u64> {
        self.debt_for_loan_notes(notes, Rounding::Up)?
            .to_tokens(Rounding::Up)
    }

    /// Loan notes a payment of `tokens` fully retires, rounded down
    pub fn loan_notes_for_tokens(&self, tokens: u64) -> LendingResult<u64> {
        self.loan_notes_for_debt(Number::from_tokens(tokens)?, Rounding::Down)
    }

    // ========================================================================
    // Amount Resolution
    // ========================================================================

    /// Resolve a deposit into `(tokens charged, notes minted)`
    pub fn resolve_deposit(&self, amount: Amount) -> LendingResult<(u64, u64)> {
        let (tokens, notes) = match amount {
            Amount::Tokens(tokens) => (tokens, self.deposit_notes_for_tokens(tokens, Rounding::Down)?),
            Amount::DepositNotes(notes) => (self.deposit_notes_to_tokens(notes, Rounding::Up)?, notes),
            Amount::LoanNotes(_) => return Err(LendingError::InvalidAmount("deposit takes tokens or deposit notes")),
        };
        ensure_nonzero(tokens, notes)?;
        Ok((tokens, notes))
    }

    /// Resolve a withdrawal into `(tokens paid, notes burned)`
    pub fn resolve_withdrawal(&self, amount: Amount) -> LendingResult<(u64, u64)> {
        let (tokens, notes) = match amount {
            Amount::Tokens(tokens) => (tokens, self.deposit_notes_for_tokens(tokens, Rounding::Up)?),
            Amount::DepositNotes(notes) => (self.deposit_notes_to_tokens(notes, Rounding::Down)?, notes),
            Amount::LoanNotes(_) => {
                return Err(LendingError::InvalidAmount("withdraw takes tokens or deposit notes"))
            }
        };
        ensure_nonzero(tokens, notes)?;
        Ok((tokens, notes))
    }

    /// Resolve a repayment into `(tokens owed, loan notes retired)`
    ///
    /// `max_notes` caps the notes retired, so a token amount larger than
    /// the position repays the position exactly.
    pub fn resolve_repayment(&self, amount: Amount, max_notes: u64) -> LendingResult<(u64, u64)> {
        let notes = match amount {
            Amount::LoanNotes(notes) => {
                if notes > max_notes {
                    return Err(LendingError::InsufficientBalance {
                        requested: notes,
                        available: max_notes,
                    });
                }
                notes
            }
            Amount::Tokens(tokens) => self.loan_notes_for_tokens(tokens)?.min(max_notes),
            Amount::DepositNotes(_) => {
                return Err(LendingError::InvalidAmount("repay takes tokens or loan notes"))
            }
        };
        if notes == 0 {
            return Err(LendingError::InvalidAmount("repayment retires no loan notes"));
        }
        Ok((self.loan_notes_to_tokens(notes)?, notes))
    }
}

/// Deposit notes moved by a collateral transfer
///
/// Pledging tokens' worth rounds down, releasing rounds up.
pub fn collateral_notes(reserve: &Reserve, amount: Amount, rounding: Rounding) -> LendingResult<u64> {
    let notes = match amount {
        Amount::DepositNotes(notes) => notes,
        Amount::Tokens(tokens) => reserve.deposit_notes_for_tokens(tokens, rounding)?,
        Amount::LoanNotes(_) => {
            return Err(LendingError::InvalidAmount("collateral is held in deposit notes"))
        }
    };
    if notes == 0 {
        return Err(LendingError::InvalidAmount("amount converts to zero notes"));
    }
    Ok(notes)
}

fn ensure_nonzero(tokens: u64, notes: u64) -> LendingResult<()> {
    if tokens == 0 || notes == 0 {
        return Err(LendingError::InvalidAmount("amount converts to zero"));
    }
    Ok(())
}
