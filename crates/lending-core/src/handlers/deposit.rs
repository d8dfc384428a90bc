//! Deposit tokens into a reserve in exchange for deposit notes.

use tracing::info;

use crate::errors::{LendingError, LendingResult};
use crate::handlers::{commit, rejected, Host, OperationReceipt, Staging};
use crate::math::safe_add_u64;
use crate::state::{DepositAccount, Market};
use crate::types::{Amount, MarketFlags};

/// Deposit into the account's reserve
///
/// `Amount::Tokens(t)` mints `floor(t / rate)` notes; `Amount::DepositNotes(n)`
/// charges `ceil(n × rate)` tokens.
pub fn deposit(
    market: &mut Market,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    execute(market, account, host, amount).map_err(|err| rejected("deposit", err))
}

fn execute(
    market: &mut Market,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_DEPOSITS)?;
    if amount.value() == 0 {
        return Err(LendingError::InvalidAmount("deposit amount is zero"));
    }
    account.ensure_belongs(&market.id, account.reserve)?;

    let id = account.reserve;
    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(id)?;

    let reserve = staging.get_mut(id)?;
    let (tokens, notes) = reserve.resolve_deposit(amount)?;
    reserve.state.total_deposits = safe_add_u64(reserve.state.total_deposits, tokens)?;
    reserve.state.total_deposit_notes = safe_add_u64(reserve.state.total_deposit_notes, notes)?;
    let vault = reserve.vault;

    let mut staged_account = *account;
    staged_account.credit(notes)?;

    let staged = staging.finish();
    host.vault.transfer_in(&vault, tokens)?;

    *account = staged_account;
    let receipt = commit(market, staged, id, tokens, notes)?;
    info!(market = %market.id, reserve = %id, owner = %account.owner, tokens, notes, "deposit");
    Ok(receipt)
}
