//! # Market
//!
//! A market groups reserves that share a quote currency and holds the halt
//! flags and owner consulted by every operation. The market is always
//! passed explicitly; nothing about it is global.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::DEFAULT_MAX_PRICE_AGE_SECS;
use crate::errors::{LendingError, LendingResult};
use crate::state::Reserve;
use crate::types::{Address, MarketFlags, ReserveConfig, ReserveId};

/// Asset accounts of a reserve being registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveAccounts {
    pub mint: Address,
    pub vault: Address,
    pub oracle: Address,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: Address,
    pub quote_currency: Address,
    pub owner: Address,
    pub flags: MarketFlags,
    /// Oldest oracle price accepted, in seconds
    pub max_price_age: u64,
    reserves: BTreeMap<ReserveId, Reserve>,
}

impl Market {
    pub fn new(id: Address, quote_currency: Address, owner: Address) -> Self {
        Self {
            id,
            quote_currency,
            owner,
            flags: MarketFlags::empty(),
            max_price_age: DEFAULT_MAX_PRICE_AGE_SECS,
            reserves: BTreeMap::new(),
        }
    }

    pub fn with_max_price_age(mut self, seconds: u64) -> Self {
        self.max_price_age = seconds;
        self
    }

    // ========================================================================
    // Reserves
    // ========================================================================

    /// Add a reserve with the next free id
    pub fn register_reserve(
        &mut self,
        caller: &Address,
        accounts: ReserveAccounts,
        config: ReserveConfig,
        now: u64,
    ) -> LendingResult<ReserveId> {
        self.ensure_owner(caller)?;

        if self.reserves.values().any(|r| r.mint == accounts.mint) {
            return Err(LendingError::invalid_config("mint", "already has a reserve in this market"));
        }
        if self.reserves.values().any(|r| r.vault == accounts.vault) {
            return Err(LendingError::invalid_config("vault", "already used by another reserve"));
        }

        let next = self
            .reserves
            .keys()
            .next_back()
            .map(|id| id.0.checked_add(1).ok_or(LendingError::ArithmeticOverflow))
            .transpose()?
            .unwrap_or(0);
        let id = ReserveId(next);

        let reserve = Reserve::new(
            id,
            self.id,
            accounts.mint,
            accounts.vault,
            accounts.oracle,
            accounts.decimals,
            config,
            now,
        )?;
        self.reserves.insert(id, reserve);

        info!(market = %self.id, reserve = %id, mint = %accounts.mint, "registered reserve");
        Ok(id)
    }

    pub fn reserve(&self, id: ReserveId) -> LendingResult<&Reserve> {
        self.reserves.get(&id).ok_or(LendingError::UnknownReserve(id))
    }

    pub fn reserve_by_mint(&self, mint: &Address) -> Option<&Reserve> {
        self.reserves.values().find(|r| &r.mint == mint)
    }

    pub fn reserves(&self) -> impl Iterator<Item = &Reserve> {
        self.reserves.values()
    }

    pub(crate) fn reserve_mut(&mut self, id: ReserveId) -> LendingResult<&mut Reserve> {
        self.reserves.get_mut(&id).ok_or(LendingError::UnknownReserve(id))
    }

    /// Write back reserves staged by an operation
    pub(crate) fn commit_reserves(&mut self, staged: BTreeMap<ReserveId, Reserve>) {
        for (id, reserve) in staged {
            self.reserves.insert(id, reserve);
        }
    }

    // ========================================================================
    // Owner Controls
    // ========================================================================

    pub fn ensure_owner(&self, caller: &Address) -> LendingResult<()> {
        if caller != &self.owner {
            warn!(market = %self.id, %caller, "rejected owner operation");
            return Err(LendingError::Unauthorized);
        }
        Ok(())
    }

    /// Replace the halt flags; effective for the next operation
    pub fn set_flags(&mut self, caller: &Address, flags: MarketFlags) -> LendingResult<()> {
        self.ensure_owner(caller)?;
        info!(market = %self.id, from = ?self.flags, to = ?flags, "updated market flags");
        self.flags = flags;
        Ok(())
    }

    /// Replace a reserve's configuration after accruing under the old one
    pub fn update_reserve_config(
        &mut self,
        caller: &Address,
        id: ReserveId,
        config: ReserveConfig,
        now: u64,
    ) -> LendingResult<()> {
        self.ensure_owner(caller)?;
        config.validate()?;

        let market = self.id;
        let mut staged = self.reserve(id)?.clone();
        staged.accrue(now)?;
        staged.config = config;
        staged.state.last_updated = staged.state.last_updated.max(now);
        *self.reserve_mut(id)? = staged;

        info!(%market, reserve = %id, "updated reserve config");
        Ok(())
    }

    /// Reject the operation if any of `halts` is set
    pub fn ensure_not_halted(&self, halts: MarketFlags) -> LendingResult<()> {
        if self.flags.intersects(halts) {
            warn!(market = %self.id, flags = ?self.flags, "operation halted");
            return Err(LendingError::OperationHalted);
        }
        Ok(())
    }
}
