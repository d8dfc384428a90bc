//! Borrow tokens against an obligation's collateral.

use tracing::info;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{LendingError, LendingResult};
use crate::handlers::{commit, rejected, Host, OperationReceipt, Staging};
use crate::math::{safe_add_u64, safe_sub_u64, Number, Rounding};
use crate::state::{HealthReport, Market, Obligation};
use crate::types::{Amount, MarketFlags, ReserveId};

/// Borrow `amount` tokens from reserve `id`
///
/// The debt recorded is the principal plus the loan origination fee; the fee
/// share is protocol revenue. Loan notes are minted rounding up.
pub fn borrow(
    market: &mut Market,
    obligation: &mut Obligation,
    id: ReserveId,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    execute(market, obligation, id, host, amount).map_err(|err| rejected("borrow", err))
}

fn execute(
    market: &mut Market,
    obligation: &mut Obligation,
    id: ReserveId,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<OperationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_BORROWS)?;
    let Amount::Tokens(tokens) = amount else {
        return Err(LendingError::InvalidAmount("borrow takes a token amount"));
    };
    if tokens == 0 {
        return Err(LendingError::InvalidAmount("borrow amount is zero"));
    }
    obligation.ensure_market(&market.id)?;

    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(id)?;

    let reserve = staging.get_mut(id)?;
    let fee_bps = reserve.config.loan_origination_fee as u128;
    let principal = Number::from_tokens(tokens)?;
    let debt_added = principal.mul_ratio(
        BPS_DENOMINATOR as u128 + fee_bps,
        BPS_DENOMINATOR as u128,
        Rounding::Up,
    )?;
    let fee = debt_added.checked_sub(principal)?;
    let notes = reserve.loan_notes_for_debt(debt_added, Rounding::Up)?;

    if tokens > reserve.state.total_deposits {
        return Err(LendingError::InsufficientLiquidity {
            requested: tokens,
            available: reserve.state.total_deposits,
        });
    }
    reserve.state.total_deposits = safe_sub_u64(reserve.state.total_deposits, tokens)?;
    reserve.state.outstanding_debt = reserve.state.outstanding_debt.checked_add(debt_added)?;
    reserve.state.total_loan_notes = safe_add_u64(reserve.state.total_loan_notes, notes)?;
    reserve.state.uncollected_fees = reserve.state.uncollected_fees.checked_add(fee)?;
    let vault = reserve.vault;

    let mut staged_obligation = obligation.clone();
    staged_obligation.add_loan(id, notes)?;

    staging.load_obligation(&staged_obligation)?;
    HealthReport::evaluate(&staged_obligation, &staging)?.ensure_healthy()?;

    let staged = staging.finish();
    host.vault.transfer_out(&vault, tokens)?;

    *obligation = staged_obligation;
    let receipt = commit(market, staged, id, tokens, notes)?;
    info!(
        market = %market.id,
        reserve = %id,
        owner = %obligation.owner,
        tokens,
        notes,
        fee = %fee,
        "borrow"
    );
    Ok(receipt)
}
