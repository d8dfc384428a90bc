//! Bring a reserve up to date with the clock and its oracle.

use tracing::{info, warn};

use crate::errors::LendingResult;
use crate::handlers::Host;
use crate::oracle::fresh_price;
use crate::state::{Market, ReserveSnapshot};
use crate::types::ReserveId;

/// Refresh reserve `id`
///
/// With a usable price the reserve is re-validated, accrued to now and its
/// fees swept. Without one it is marked invalidated and the snapshot reports
/// that; this is a committed outcome, not an error. Refreshing twice at the
/// same timestamp changes nothing the second time.
pub fn refresh_reserve(market: &mut Market, id: ReserveId, host: &Host<'_>) -> LendingResult<ReserveSnapshot> {
    let now = host.clock.unix_timestamp();
    let max_age = market.max_price_age;
    let market_id = market.id;

    let current = market.reserve(id)?;
    let price = fresh_price(host.oracle, &current.oracle, now, max_age);

    let mut staged = current.clone();
    match price {
        Some(_) => {
            staged.accrue(now)?;
            staged.sweep_fees()?;
            if staged.state.invalidated {
                info!(market = %market_id, reserve = %id, "reserve revalidated");
            }
            staged.state.invalidated = false;
            staged.state.last_updated = staged.state.last_updated.max(now);
        }
        None => {
            if !staged.state.invalidated {
                warn!(market = %market_id, reserve = %id, "reserve invalidated");
            }
            staged.state.invalidated = true;
        }
    }

    let snapshot = staged.snapshot()?;
    market.commit_reserves(std::iter::once((id, staged)).collect());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_YEAR;
    use crate::errors::LendingError;
    use crate::handlers::test_support::{host, Fixture};
    use crate::handlers::{borrow, deposit, deposit_collateral, repay};
    use crate::math::Rounding;
    use crate::state::{DepositAccount, Obligation};
    use crate::types::{Address, Amount};

    #[test]
    fn test_stale_price_invalidates_until_refreshed() {
        let mut f = Fixture::new();
        f.clock.advance(120);

        let snapshot = refresh_reserve(&mut f.market, ReserveId(0), &host!(f)).unwrap();
        assert!(snapshot.invalidated);
        assert!(f.market.reserve(ReserveId(0)).unwrap().state.invalidated);

        // A fresh price alone is not enough; the reserve must be refreshed
        f.set_price(ReserveId(0), 1);
        let mut account = DepositAccount::new(f.market.id, ReserveId(0), Address::from_seed(1));
        assert_eq!(
            deposit(&mut f.market, &mut account, &mut host!(f), Amount::Tokens(10)),
            Err(LendingError::ReserveInvalidated(ReserveId(0)))
        );

        let snapshot = refresh_reserve(&mut f.market, ReserveId(0), &host!(f)).unwrap();
        assert!(!snapshot.invalidated);
        deposit(&mut f.market, &mut account, &mut host!(f), Amount::Tokens(10)).unwrap();
    }

    #[test]
    fn test_refresh_accrues_and_sweeps_fees() {
        let mut f = Fixture::new();
        let mut supply = DepositAccount::new(f.market.id, ReserveId(0), Address::from_seed(1));
        deposit(&mut f.market, &mut supply, &mut host!(f), Amount::Tokens(1_000_000_000)).unwrap();

        let borrower = Address::from_seed(2);
        let mut wsol = DepositAccount::new(f.market.id, ReserveId(1), borrower);
        deposit(&mut f.market, &mut wsol, &mut host!(f), Amount::Tokens(10_000_000)).unwrap();
        let mut obligation = Obligation::new(f.market.id, borrower);
        deposit_collateral(&mut f.market, &mut obligation, &mut wsol, &mut host!(f), Amount::Tokens(10_000_000))
            .unwrap();
        borrow(&mut f.market, &mut obligation, ReserveId(0), &mut host!(f), Amount::Tokens(500_000_000)).unwrap();

        let rate_before = f.market.reserve(ReserveId(0)).unwrap().deposit_note_rate().unwrap();
        f.clock.advance(30);
        f.set_price(ReserveId(0), 1);

        // 500,000 units of origination fee exceed the 10 token threshold
        let snapshot = refresh_reserve(&mut f.market, ReserveId(0), &host!(f)).unwrap();
        assert_eq!(snapshot.accrued_until, 1_030);
        assert!(snapshot.fee_note_balance > 0);
        assert_eq!(snapshot.uncollected_fees.to_tokens(Rounding::Down).unwrap(), 0);
        assert!(snapshot.deposit_note_rate >= rate_before);

        let again = refresh_reserve(&mut f.market, ReserveId(0), &host!(f)).unwrap();
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_reserve_usable_after_long_idle_gap() {
        let mut f = Fixture::new();
        let mut supply = DepositAccount::new(f.market.id, ReserveId(0), Address::from_seed(1));
        deposit(&mut f.market, &mut supply, &mut host!(f), Amount::Tokens(1_000_000_000)).unwrap();

        let borrower = Address::from_seed(2);
        let mut wsol = DepositAccount::new(f.market.id, ReserveId(1), borrower);
        deposit(&mut f.market, &mut wsol, &mut host!(f), Amount::Tokens(10_000_000)).unwrap();
        let mut obligation = Obligation::new(f.market.id, borrower);
        deposit_collateral(&mut f.market, &mut obligation, &mut wsol, &mut host!(f), Amount::Tokens(10_000_000))
            .unwrap();
        borrow(&mut f.market, &mut obligation, ReserveId(0), &mut host!(f), Amount::Tokens(500_000_000)).unwrap();

        f.clock.advance(14 * SECONDS_PER_YEAR);
        f.set_price(ReserveId(0), 1);
        f.set_price(ReserveId(1), 100);

        let snapshot = refresh_reserve(&mut f.market, ReserveId(0), &host!(f)).unwrap();
        assert!(!snapshot.invalidated);
        assert!(snapshot.debt_tokens().unwrap() > 500_500_000 * 100);

        let notes = obligation.loan_notes(ReserveId(0));
        repay(&mut f.market, &mut obligation, ReserveId(0), &mut host!(f), Amount::LoanNotes(notes)).unwrap();
        assert!(!obligation.has_loans());
    }
}
