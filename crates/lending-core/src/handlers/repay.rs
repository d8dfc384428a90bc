//! Repay loan notes of an obligation.

use tracing::info;

use crate::errors::{LendingError, LendingResult};
use crate::handlers::{commit, rejected, Host, OperationReceipt, Staging};
use crate::math::{safe_add_u64, safe_sub_u64, Rounding};
use crate::state::{Market, Obligation, Reserve};
use crate::types::{Amount, MarketFlags, ReserveId};

/// Repay part or all of the obligation's loan in reserve `id`
///
/// `Amount::LoanNotes(n)` retires `n` notes for `ceil(n × debt rate)`
/// tokens. `Amount::Tokens(t)` retires as many whole notes as `t` covers,
/// capped at the position, and charges the recomputed amount.
pub fn repay(
    market: &mut Market,
    obligation: &mut Obligation,
    id: ReserveId,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    execute(market, obligation, id, host, amount).map_err(|err| rejected("repay", err))
}

fn execute(
    market: &mut Market,
    obligation: &mut Obligation,
    id: ReserveId,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_REPAYS)?;
    if amount.value() == 0 {
        return Err(LendingError::InvalidAmount("repay amount is zero"));
    }
    obligation.ensure_market(&market.id)?;

    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(id)?;

    let reserve = staging.get_mut(id)?;
    let (tokens, notes) = reserve.resolve_repayment(amount, obligation.loan_notes(id))?;
    retire_loan_notes(reserve, tokens, notes)?;
    let vault = reserve.vault;

    let mut staged_obligation = obligation.clone();
    staged_obligation.remove_loan(id, notes)?;

    let staged = staging.finish();
    host.vault.transfer_in(&vault, tokens)?;

    *obligation = staged_obligation;
    let receipt = commit(market, staged, id, tokens, notes)?;
    info!(market = %market.id, reserve = %id, owner = %obligation.owner, tokens, notes, "repay");
    Ok(receipt)
}

/// Apply a repayment of `notes` loan notes for `tokens` to the reserve
pub(crate) fn retire_loan_notes(reserve: &mut Reserve, tokens: u64, notes: u64) -> LendingResult<()> {
    let share = reserve.debt_for_loan_notes(notes, Rounding::Up)?;
    let settled = share.min(reserve.state.outstanding_debt);

    reserve.state.outstanding_debt = reserve.state.outstanding_debt.checked_sub(settled)?;
    reserve.state.total_loan_notes = safe_sub_u64(reserve.state.total_loan_notes, notes)?;
    reserve.state.total_deposits = safe_add_u64(reserve.state.total_deposits, tokens)?;
    Ok(())
}
