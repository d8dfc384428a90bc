//! Redeem deposit notes for tokens.

use tracing::info;

use crate::errors::{LendingError, LendingResult};
use crate::handlers::{commit, rejected, Host, OperationReceipt, Staging};
use crate::math::safe_sub_u64;
use crate::state::{DepositAccount, Market};
use crate::types::{Amount, MarketFlags};

/// Withdraw from the account's reserve
///
/// `Amount::Tokens(t)` pays exactly `t` and burns `ceil(t / rate)` notes;
/// `Amount::DepositNotes(n)` burns `n` and pays `floor(n × rate)`.
pub fn withdraw(
    market: &mut Market,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    execute(market, account, host, amount).map_err(|err| rejected("withdraw", err))
}

fn execute(
    market: &mut Market,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_WITHDRAWALS)?;
    if amount.value() == 0 {
        return Err(LendingError::InvalidAmount("withdraw amount is zero"));
    }
    account.ensure_belongs(&market.id, account.reserve)?;

    let id = account.reserve;
    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(id)?;

    let reserve = staging.get_mut(id)?;
    let (tokens, notes) = reserve.resolve_withdrawal(amount)?;

    let mut staged_account = *account;
    staged_account.debit(notes)?;

    if tokens > reserve.state.total_deposits {
        return Err(LendingError::InsufficientLiquidity {
            requested: tokens,
            available: reserve.state.total_deposits,
        });
    }
    reserve.state.total_deposits = safe_sub_u64(reserve.state.total_deposits, tokens)?;
    reserve.state.total_deposit_notes = safe_sub_u64(reserve.state.total_deposit_notes, notes)?;
    let vault = reserve.vault;

    let staged = staging.finish();
    host.vault.transfer_out(&vault, tokens)?;

    *account = staged_account;
    let receipt = commit(market, staged, id, tokens, notes)?;
    info!(market = %market.id, reserve = %id, owner = %account.owner, tokens, notes, "withdraw");
    Ok(receipt)
}
