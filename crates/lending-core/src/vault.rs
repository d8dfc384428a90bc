//! Token custody interface.
//!
//! Handlers move tokens only through [`TokenVault`], after every check has
//! passed and before any staged state is committed. A transfer failure
//! aborts the operation with nothing written.

use std::collections::HashMap;

use thiserror::Error;

use crate::errors::LendingError;
use crate::types::Address;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("vault {vault} holds {available}, cannot pay {requested}")]
    InsufficientFunds {
        vault: Address,
        requested: u64,
        available: u64,
    },

    #[error("vault {0} balance overflow")]
    Overflow(Address),

    #[error("{0}")]
    Host(String),
}

impl From<VaultError> for LendingError {
    fn from(err: VaultError) -> Self {
        LendingError::VaultTransfer(err.to_string())
    }
}

/// Asset ledger primitive supplied by the host
pub trait TokenVault {
    /// Move `amount` from the acting user into `vault`
    fn transfer_in(&mut self, vault: &Address, amount: u64) -> Result<(), VaultError>;

    /// Move `amount` out of `vault` to the acting user
    fn transfer_out(&mut self, vault: &Address, amount: u64) -> Result<(), VaultError>;
}

/// Vault balances kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryVault {
    balances: HashMap<Address, u64>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, vault: &Address) -> u64 {
        self.balances.get(vault).copied().unwrap_or(0)
    }
}

impl TokenVault for InMemoryVault {
    fn transfer_in(&mut self, vault: &Address, amount: u64) -> Result<(), VaultError> {
        let balance = self.balances.entry(*vault).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(VaultError::Overflow(*vault))?;
        Ok(())
    }

    fn transfer_out(&mut self, vault: &Address, amount: u64) -> Result<(), VaultError> {
        let available = self.balance(vault);
        if amount > available {
            return Err(VaultError::InsufficientFunds {
                vault: *vault,
                requested: amount,
                available,
            });
        }
        self.balances.insert(*vault, available - amount);
        Ok(())
    }
}
