//! Move deposit notes between a deposit account and an obligation.
//!
//! No tokens move. Pledging can only improve health and skips the check;
//! releasing re-evaluates the whole obligation against every referenced
//! reserve before anything is written.

use tracing::info;

use crate::errors::{LendingError, LendingResult};
use crate::handlers::{commit, rejected, Host, OperationReceipt, Staging};
use crate::math::Rounding;
use crate::state::{collateral_notes, DepositAccount, HealthReport, Market, Obligation};
use crate::types::{Amount, MarketFlags};

/// Pledge deposit notes from `account` as collateral
pub fn deposit_collateral(
    market: &mut Market,
    obligation: &mut Obligation,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    execute_deposit(market, obligation, account, host, amount)
        .map_err(|err| rejected("deposit_collateral", err))
}

/// Release collateral notes back to `account`
pub fn withdraw_collateral(
    market: &mut Market,
    obligation: &mut Obligation,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    execute_withdraw(market, obligation, account, host, amount)
        .map_err(|err| rejected("withdraw_collateral", err))
}

fn check_accounts(market: &Market, obligation: &Obligation, account: &DepositAccount) -> LendingResult<()> {
    obligation.ensure_market(&market.id)?;
    account.ensure_belongs(&market.id, account.reserve)?;
    if account.owner != obligation.owner {
        return Err(LendingError::AccountMismatch);
    }
    Ok(())
}

fn execute_deposit(
    market: &mut Market,
    obligation: &mut Obligation,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_DEPOSITS)?;
    if amount.value() == 0 {
        return Err(LendingError::InvalidAmount("collateral amount is zero"));
    }
    check_accounts(market, obligation, account)?;

    let id = account.reserve;
    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(id)?;

    let notes = collateral_notes(staging.get(id)?, amount, Rounding::Down)?;

    let mut staged_account = *account;
    staged_account.debit(notes)?;
    let mut staged_obligation = obligation.clone();
    staged_obligation.add_collateral(id, notes)?;

    let staged = staging.finish();
    *account = staged_account;
    *obligation = staged_obligation;
    let receipt = commit(market, staged, id, 0, notes)?;
    info!(market = %market.id, reserve = %id, owner = %obligation.owner, notes, "deposit collateral");
    Ok(receipt)
}

fn execute_withdraw(
    market: &mut Market,
    obligation: &mut Obligation,
    account: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_WITHDRAWALS)?;
    if amount.value() == 0 {
        return Err(LendingError::InvalidAmount("collateral amount is zero"));
    }
    check_accounts(market, obligation, account)?;

    let id = account.reserve;
    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(id)?;

    let notes = collateral_notes(staging.get(id)?, amount, Rounding::Up)?;

    let mut staged_obligation = obligation.clone();
    staged_obligation.remove_collateral(id, notes)?;
    let mut staged_account = *account;
    staged_account.credit(notes)?;

    staging.load_obligation(&staged_obligation)?;
    HealthReport::evaluate(&staged_obligation, &staging)?.ensure_healthy()?;

    let staged = staging.finish();
    *account = staged_account;
    *obligation = staged_obligation;
    let receipt = commit(market, staged, id, 0, notes)?;
    info!(market = %market.id, reserve = %id, owner = %obligation.owner, notes, "withdraw collateral");
    Ok(receipt)
}
