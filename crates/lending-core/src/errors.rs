//! # Core Error Types
//!
//! Every rejection the engine can produce. Each variant carries a stable
//! numeric code so hosts can distinguish halted, undercollateralized and
//! stale-price conditions without matching on messages.

use thiserror::Error;

use crate::types::ReserveId;

/// Errors returned by the accounting engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LendingError {
    // ========================================================================
    // Operation Gates
    // ========================================================================
    #[error("Operation halted by market flags")]
    OperationHalted,

    #[error("Reserve {0} is invalidated: price missing, stale or reserve inconsistent")]
    ReserveInvalidated(ReserveId),

    // ========================================================================
    // Economic Checks
    // ========================================================================
    #[error("Insufficient collateral: {collateral_value} available, {required_value} required")]
    InsufficientCollateral {
        collateral_value: u128,
        required_value: u128,
    },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    #[error("Obligation is healthy and cannot be liquidated")]
    ObligationHealthy,

    // ========================================================================
    // Math Errors
    // ========================================================================
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Invalid reserve configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown reserve {0}")]
    UnknownReserve(ReserveId),

    #[error("Account does not belong to this market, reserve or owner")]
    AccountMismatch,

    // ========================================================================
    // Authorization and Host Errors
    // ========================================================================
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Vault transfer failed: {0}")]
    VaultTransfer(String),
}

/// Result type using core errors
pub type LendingResult<T> = Result<T, LendingError>;

impl LendingError {
    /// Base of the error code range
    pub const CODE_OFFSET: u32 = 6000;

    /// Stable numeric code for this error
    pub fn code(&self) -> u32 {
        let index = match self {
            LendingError::OperationHalted => 0,
            LendingError::ReserveInvalidated(_) => 1,
            LendingError::InsufficientCollateral { .. } => 2,
            LendingError::InsufficientBalance { .. } => 3,
            LendingError::ArithmeticOverflow => 4,
            LendingError::InsufficientLiquidity { .. } => 5,
            LendingError::ObligationHealthy => 6,
            LendingError::InvalidAmount(_) => 7,
            LendingError::InvalidConfig(_) => 8,
            LendingError::UnknownReserve(_) => 9,
            LendingError::AccountMismatch => 10,
            LendingError::Unauthorized => 11,
            LendingError::VaultTransfer(_) => 12,
        };
        Self::CODE_OFFSET + index
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: &str, reason: &str) -> Self {
        Self::InvalidConfig(format!("{}: {}", field, reason))
    }
}
