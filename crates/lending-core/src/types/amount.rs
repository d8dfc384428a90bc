//! # Operation Amounts
//!
//! An [`Amount`] is a number tagged with the unit it is denominated in. The
//! tag decides which note-accounting conversion an operation applies; a
//! note quantity is never read as a token quantity without going through a
//! conversion at the reserve's current exchange rate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit an [`Amount`] is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountUnits {
    Tokens,
    DepositNotes,
    LoanNotes,
}

/// Operation input quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "units", content = "value", rename_all = "snake_case")]
pub enum Amount {
    /// Native smallest units of the reserve asset
    Tokens(u64),
    /// Deposit notes of the reserve
    DepositNotes(u64),
    /// Loan notes of the reserve
    LoanNotes(u64),
}

impl Amount {
    pub fn tokens(value: u64) -> Self {
        Amount::Tokens(value)
    }

    pub fn deposit_notes(value: u64) -> Self {
        Amount::DepositNotes(value)
    }

    pub fn loan_notes(value: u64) -> Self {
        Amount::LoanNotes(value)
    }

    /// Raw numeric value, regardless of units
    pub fn value(&self) -> u64 {
        match *self {
            Amount::Tokens(v) | Amount::DepositNotes(v) | Amount::LoanNotes(v) => v,
        }
    }

    pub fn units(&self) -> AmountUnits {
        match self {
            Amount::Tokens(_) => AmountUnits::Tokens,
            Amount::DepositNotes(_) => AmountUnits::DepositNotes,
            Amount::LoanNotes(_) => AmountUnits::LoanNotes,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Tokens(v) => write!(f, "{} tokens", v),
            Amount::DepositNotes(v) => write!(f, "{} deposit notes", v),
            Amount::LoanNotes(v) => write!(f, "{} loan notes", v),
        }
    }
}
