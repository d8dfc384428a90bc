//! Free (non-collateral) deposit notes of one user in one reserve.

use serde::{Deserialize, Serialize};

use crate::errors::{LendingError, LendingResult};
use crate::math::{safe_add_u64, safe_sub_u64};
use crate::types::{Address, ReserveId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAccount {
    pub market: Address,
    pub reserve: ReserveId,
    pub owner: Address,
    pub notes: u64,
}

impl DepositAccount {
    pub fn new(market: Address, reserve: ReserveId, owner: Address) -> Self {
        Self {
            market,
            reserve,
            owner,
            notes: 0,
        }
    }

    pub fn credit(&mut self, notes: u64) -> LendingResult<()> {
        self.notes = safe_add_u64(self.notes, notes)?;
        Ok(())
    }

    pub fn debit(&mut self, notes: u64) -> LendingResult<()> {
        if notes > self.notes {
            return Err(LendingError::InsufficientBalance {
                requested: notes,
                available: self.notes,
            });
        }
        self.notes = safe_sub_u64(self.notes, notes)?;
        Ok(())
    }

    pub(crate) fn ensure_belongs(&self, market: &Address, reserve: ReserveId) -> LendingResult<()> {
        if &self.market != market || self.reserve != reserve {
            return Err(LendingError::AccountMismatch);
        }
        Ok(())
    }
}
