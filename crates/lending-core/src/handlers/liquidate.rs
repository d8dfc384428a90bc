//! # Liquidation
//!
//! An unhealthy obligation may have one of its loans repaid by a third
//! party. In exchange the liquidator receives collateral deposit notes worth
//! the repaid value plus the collateral reserve's `liquidation_premium`,
//! capped at the obligation's balance in that reserve. Settling the seized
//! collateral on an external venue is outside this crate; the venue's limits
//! are available from [`ReserveConfig::dex_liquidation_limits`].
//!
//! [`ReserveConfig::dex_liquidation_limits`]: crate::types::ReserveConfig::dex_liquidation_limits

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{LendingError, LendingResult};
use crate::handlers::repay::retire_loan_notes;
use crate::handlers::{rejected, Host, Staging};
use crate::math::{Number, Rounding};
use crate::state::{DepositAccount, HealthReport, Market, Obligation, ReserveSnapshot};
use crate::types::{Amount, MarketFlags, ReserveId};

/// Outcome of a committed liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationReceipt {
    /// Tokens paid into the loan reserve
    pub repaid_tokens: u64,
    pub repaid_loan_notes: u64,
    /// Collateral deposit notes credited to the liquidator
    pub seized_notes: u64,
    /// Quote value of the repayment
    pub repaid_value: Number,
    pub loan_reserve: ReserveSnapshot,
    pub collateral_reserve: ReserveSnapshot,
}

/// Repay `amount` of the obligation's loan in `loan_reserve` and seize
/// collateral from the liquidator account's reserve
pub fn liquidate(
    market: &mut Market,
    obligation: &mut Obligation,
    loan_reserve: ReserveId,
    liquidator: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<LiquidationReceipt> {
    execute(market, obligation, loan_reserve, liquidator, host, amount)
        .map_err(|err| rejected("liquidate", err))
}

fn execute(
    market: &mut Market,
    obligation: &mut Obligation,
    loan_id: ReserveId,
    liquidator: &mut DepositAccount,
    host: &mut Host<'_>,
    amount: Amount,
) -> LendingResult<LiquidationReceipt> {
    market.ensure_not_halted(MarketFlags::HALT_REPAYS)?;
    if amount.value() == 0 {
        return Err(LendingError::InvalidAmount("liquidation amount is zero"));
    }
    obligation.ensure_market(&market.id)?;
    let collateral_id = liquidator.reserve;
    liquidator.ensure_belongs(&market.id, collateral_id)?;

    let now = host.clock.unix_timestamp();
    let mut staging = Staging::new(market, host.oracle, now);
    staging.load(loan_id)?;
    staging.load(collateral_id)?;
    staging.load_obligation(obligation)?;

    let health = HealthReport::evaluate(obligation, &staging)?;
    if health.is_healthy() {
        return Err(LendingError::ObligationHealthy);
    }

    // Repayment side
    let loan_price = staging.price(loan_id)?;
    let loan = staging.get_mut(loan_id)?;
    let (repaid_tokens, repaid_notes) = loan.resolve_repayment(amount, obligation.loan_notes(loan_id))?;
    let repaid_value = loan.market_value(repaid_tokens, loan_price, Rounding::Down)?;
    retire_loan_notes(loan, repaid_tokens, repaid_notes)?;
    let loan_vault = loan.vault;

    // Seizure side, valued after the repayment is applied
    let collateral_price = staging.price(collateral_id)?;
    let collateral = staging.get(collateral_id)?;
    let seize_value = repaid_value.mul_ratio(
        BPS_DENOMINATOR as u128 + collateral.config.liquidation_premium as u128,
        BPS_DENOMINATOR as u128,
        Rounding::Down,
    )?;
    let seize_tokens = collateral.tokens_for_value(seize_value, collateral_price, Rounding::Down)?;
    let seized_notes = collateral
        .deposit_notes_for_tokens(seize_tokens, Rounding::Down)?
        .min(obligation.collateral_notes(collateral_id));
    if seized_notes == 0 {
        return Err(LendingError::InvalidAmount("liquidation seizes no collateral"));
    }

    let mut staged_obligation = obligation.clone();
    staged_obligation.remove_loan(loan_id, repaid_notes)?;
    staged_obligation.remove_collateral(collateral_id, seized_notes)?;
    let mut staged_liquidator = *liquidator;
    staged_liquidator.credit(seized_notes)?;

    let staged = staging.finish();
    host.vault.transfer_in(&loan_vault, repaid_tokens)?;

    *obligation = staged_obligation;
    *liquidator = staged_liquidator;
    market.commit_reserves(staged);

    info!(
        market = %market.id,
        owner = %obligation.owner,
        liquidator = %liquidator.owner,
        loan_reserve = %loan_id,
        collateral_reserve = %collateral_id,
        repaid_tokens,
        seized_notes,
        "liquidate"
    );

    Ok(LiquidationReceipt {
        repaid_tokens,
        repaid_loan_notes: repaid_notes,
        seized_notes,
        repaid_value,
        loan_reserve: market.reserve(loan_id)?.snapshot()?,
        collateral_reserve: market.reserve(collateral_id)?.snapshot()?,
    })
}
