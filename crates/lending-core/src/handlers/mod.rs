//! # Operation Handlers
//!
//! Every handler is one atomic transition:
//!
//! 1. check the market halt flags
//! 2. stage copies of the reserves involved, accrued to the operation time
//! 3. convert amounts and apply the change to the staged copies
//! 4. re-evaluate collateralization if the change can reduce it
//! 5. move tokens through the host vault
//! 6. commit the staged reserves, obligation and deposit account
//!
//! Any failure before step 6 returns without writing anything, including
//! the accrual performed during staging.

pub mod admin;
pub mod borrow;
pub mod collateral;
pub mod deposit;
pub mod liquidate;
pub mod refresh;
pub mod repay;
pub mod withdraw;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::errors::{LendingError, LendingResult};
use crate::math::Number;
use crate::oracle::{fresh_price, PriceFeed};
use crate::state::{Market, Obligation, PricedReserves, Reserve, ReserveSnapshot};
use crate::types::ReserveId;
use crate::vault::TokenVault;

pub use admin::update_reserve_config;
pub use borrow::borrow;
pub use collateral::{deposit_collateral, withdraw_collateral};
pub use deposit::deposit;
pub use liquidate::{liquidate, LiquidationReceipt};
pub use refresh::refresh_reserve;
pub use repay::repay;
pub use withdraw::withdraw;

/// Services the host supplies to every operation
pub struct Host<'a> {
    pub oracle: &'a dyn PriceFeed,
    pub vault: &'a mut dyn TokenVault,
    pub clock: &'a dyn Clock,
}

impl<'a> Host<'a> {
    pub fn new(oracle: &'a dyn PriceFeed, vault: &'a mut dyn TokenVault, clock: &'a dyn Clock) -> Self {
        Self { oracle, vault, clock }
    }
}

/// Outcome of a committed single-reserve operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReceipt {
    /// Tokens moved through the vault
    pub tokens: u64,
    /// Notes minted, burned or moved
    pub notes: u64,
    /// Reserve the operation acted on, after commit
    pub reserve: ReserveSnapshot,
}

// ============================================================================
// Staging
// ============================================================================

/// Working copies of reserves touched by one operation
///
/// Each reserve is cloned from the market on first use, checked for a usable
/// price and accrued to `now`. Nothing reaches the market until
/// [`Staging::finish`] hands the copies to [`Market::commit_reserves`].
pub(crate) struct Staging<'m> {
    market: &'m Market,
    oracle: &'m dyn PriceFeed,
    now: u64,
    reserves: BTreeMap<ReserveId, Reserve>,
    prices: BTreeMap<ReserveId, Number>,
}

impl<'m> Staging<'m> {
    pub fn new(market: &'m Market, oracle: &'m dyn PriceFeed, now: u64) -> Self {
        Self {
            market,
            oracle,
            now,
            reserves: BTreeMap::new(),
            prices: BTreeMap::new(),
        }
    }

    /// Stage `id` if it is not staged yet
    pub fn load(&mut self, id: ReserveId) -> LendingResult<()> {
        if self.reserves.contains_key(&id) {
            return Ok(());
        }

        let reserve = self.market.reserve(id)?;
        if reserve.state.invalidated {
            warn!(reserve = %id, "reserve is invalidated");
            return Err(LendingError::ReserveInvalidated(id));
        }

        let price = fresh_price(self.oracle, &reserve.oracle, self.now, self.market.max_price_age)
            .ok_or(LendingError::ReserveInvalidated(id))?;

        let mut staged = reserve.clone();
        staged.accrue(self.now)?;
        staged.state.last_updated = self.now;

        self.reserves.insert(id, staged);
        self.prices.insert(id, price);
        Ok(())
    }

    /// Stage every reserve the obligation references
    pub fn load_obligation(&mut self, obligation: &Obligation) -> LendingResult<()> {
        for id in obligation.referenced_reserves() {
            self.load(id)?;
        }
        Ok(())
    }

    pub fn get(&self, id: ReserveId) -> LendingResult<&Reserve> {
        self.reserves.get(&id).ok_or(LendingError::UnknownReserve(id))
    }

    pub fn get_mut(&mut self, id: ReserveId) -> LendingResult<&mut Reserve> {
        self.reserves.get_mut(&id).ok_or(LendingError::UnknownReserve(id))
    }

    pub fn price(&self, id: ReserveId) -> LendingResult<Number> {
        self.prices.get(&id).copied().ok_or(LendingError::UnknownReserve(id))
    }

    pub fn finish(self) -> BTreeMap<ReserveId, Reserve> {
        self.reserves
    }
}

impl PricedReserves for Staging<'_> {
    fn priced_reserve(&self, id: ReserveId) -> LendingResult<(&Reserve, Number)> {
        Ok((self.get(id)?, self.price(id)?))
    }
}

/// Commit staged reserves and build the receipt for `id`
pub(crate) fn commit(
    market: &mut Market,
    staged: BTreeMap<ReserveId, Reserve>,
    id: ReserveId,
    tokens: u64,
    notes: u64,
) -> LendingResult<OperationReceipt> {
    market.commit_reserves(staged);
    Ok(OperationReceipt {
        tokens,
        notes,
        reserve: market.reserve(id)?.snapshot()?,
    })
}

/// Log a rejection at the level matching its cause and pass it through
pub(crate) fn rejected(operation: &'static str, err: LendingError) -> LendingError {
    match &err {
        LendingError::OperationHalted
        | LendingError::ReserveInvalidated(_)
        | LendingError::InsufficientCollateral { .. }
        | LendingError::Unauthorized => warn!(operation, %err, "operation rejected"),
        _ => tracing::debug!(operation, %err, "operation rejected"),
    }
    err
}
