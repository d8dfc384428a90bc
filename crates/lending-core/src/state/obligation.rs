//! Per-user collateral and loan positions within one market.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{LendingError, LendingResult};
use crate::math::{safe_add_u64, safe_sub_u64};
use crate::types::{Address, ReserveId};

/// A user's collateral deposit notes and loan notes across reserves
///
/// Created lazily on first use and never removed; positions that reach
/// zero are dropped from the maps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Obligation {
    pub market: Address,
    pub owner: Address,
    collateral: BTreeMap<ReserveId, u64>,
    loans: BTreeMap<ReserveId, u64>,
}

impl Obligation {
    pub fn new(market: Address, owner: Address) -> Self {
        Self {
            market,
            owner,
            collateral: BTreeMap::new(),
            loans: BTreeMap::new(),
        }
    }

    pub fn collateral_notes(&self, reserve: ReserveId) -> u64 {
        self.collateral.get(&reserve).copied().unwrap_or(0)
    }

    pub fn loan_notes(&self, reserve: ReserveId) -> u64 {
        self.loans.get(&reserve).copied().unwrap_or(0)
    }

    pub fn collateral(&self) -> impl Iterator<Item = (ReserveId, u64)> + '_ {
        self.collateral.iter().map(|(id, notes)| (*id, *notes))
    }

    pub fn loans(&self) -> impl Iterator<Item = (ReserveId, u64)> + '_ {
        self.loans.iter().map(|(id, notes)| (*id, *notes))
    }

    /// Every reserve this obligation holds a position in
    pub fn referenced_reserves(&self) -> Vec<ReserveId> {
        let mut ids: Vec<ReserveId> = self.collateral.keys().chain(self.loans.keys()).copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn has_loans(&self) -> bool {
        !self.loans.is_empty()
    }

    pub fn add_collateral(&mut self, reserve: ReserveId, notes: u64) -> LendingResult<()> {
        credit(&mut self.collateral, reserve, notes)
    }

    pub fn remove_collateral(&mut self, reserve: ReserveId, notes: u64) -> LendingResult<()> {
        debit(&mut self.collateral, reserve, notes)
    }

    pub fn add_loan(&mut self, reserve: ReserveId, notes: u64) -> LendingResult<()> {
        credit(&mut self.loans, reserve, notes)
    }

    pub fn remove_loan(&mut self, reserve: ReserveId, notes: u64) -> LendingResult<()> {
        debit(&mut self.loans, reserve, notes)
    }

    pub(crate) fn ensure_market(&self, market: &Address) -> LendingResult<()> {
        if &self.market != market {
            return Err(LendingError::AccountMismatch);
        }
        Ok(())
    }
}

fn credit(positions: &mut BTreeMap<ReserveId, u64>, reserve: ReserveId, notes: u64) -> LendingResult<()> {
    if notes == 0 {
        return Ok(());
    }
    let balance = positions.entry(reserve).or_insert(0);
    *balance = safe_add_u64(*balance, notes)?;
    Ok(())
}

fn debit(positions: &mut BTreeMap<ReserveId, u64>, reserve: ReserveId, notes: u64) -> LendingResult<()> {
    let available = positions.get(&reserve).copied().unwrap_or(0);
    if notes > available {
        return Err(LendingError::InsufficientBalance {
            requested: notes,
            available,
        });
    }

    let remaining = safe_sub_u64(available, notes)?;
    if remaining == 0 {
        positions.remove(&reserve);
    } else {
        positions.insert(reserve, remaining);
    }
    Ok(())
}
