//! Property-based tests for the accounting invariants of a market under
//! arbitrary sequences of operations.

mod common;

use lending_core::handlers::{
    borrow, deposit, deposit_collateral, refresh_reserve, repay, withdraw, withdraw_collateral,
};
use lending_core::{Address, Amount, DepositAccount, LendingError, MarketFlags, Number, Obligation, ReserveState};
use proptest::prelude::*;

use common::{owner, Harness, USDC, WSOL};

const BASE_SUPPLY: u64 = 1_000_000_000_000;
const WALLET: u64 = 10_000_000_000_000;

fn supplier() -> Address {
    Address::from_seed(100)
}

fn borrower() -> Address {
    Address::from_seed(200)
}

fn saver() -> Address {
    Address::from_seed(300)
}

// ============================================================================
// Test Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Deposit(u64),
    WithdrawTokens(u64),
    WithdrawNotes(u64),
    Borrow(u64),
    RepayTokens(u64),
    RepayNotes(u64),
    Tick(u64),
    Refresh,
}

/// Operations by the saver (on usdc) and the borrower (against wsol)
fn operation() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..50_000_000_000).prop_map(Op::Deposit),
        (1u64..50_000_000_000).prop_map(Op::WithdrawTokens),
        (1u64..50_000_000_000).prop_map(Op::WithdrawNotes),
        (1u64..300_000_000_000).prop_map(Op::Borrow),
        (1u64..300_000_000_000).prop_map(Op::RepayTokens),
        (1u64..300_000_000_000).prop_map(Op::RepayNotes),
        (1u64..86_400).prop_map(Op::Tick),
        Just(Op::Refresh),
    ]
}

fn operations() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(operation(), 1..40)
}

/// Any combination of the four halt flags
fn halt_flags() -> impl Strategy<Value = MarketFlags> {
    (0u64..16).prop_map(MarketFlags::from_bits_truncate)
}

// ============================================================================
// Market Setup
// ============================================================================

struct Accounts {
    saver: DepositAccount,
    borrower_wsol: DepositAccount,
    obligation: Obligation,
}

/// A market with a permanent usdc supplier and a borrower holding wsol
/// collateral worth 1,000,000
fn seeded_market() -> (Harness, Accounts) {
    let mut h = Harness::new().unwrap();
    for user in [supplier(), borrower(), saver()] {
        h.fund(user, USDC, WALLET);
        h.fund(user, WSOL, WALLET);
    }

    let market_id = h.market.id;
    let mut supply = DepositAccount::new(market_id, USDC, supplier());
    let (market, mut host) = h.act(supplier());
    deposit(market, &mut supply, &mut host, Amount::tokens(BASE_SUPPLY)).unwrap();

    let mut borrower_wsol = DepositAccount::new(market_id, WSOL, borrower());
    let mut obligation = Obligation::new(market_id, borrower());
    let (market, mut host) = h.act(borrower());
    deposit(market, &mut borrower_wsol, &mut host, Amount::tokens(10_000_000_000)).unwrap();
    deposit_collateral(
        market,
        &mut obligation,
        &mut borrower_wsol,
        &mut host,
        Amount::tokens(10_000_000_000),
    )
    .unwrap();

    let accounts = Accounts {
        saver: DepositAccount::new(market_id, USDC, saver()),
        borrower_wsol,
        obligation,
    };
    (h, accounts)
}

/// Apply one operation; rejections are part of the exploration
fn apply(h: &mut Harness, accounts: &mut Accounts, op: &Op) -> Result<(), LendingError> {
    match *op {
        Op::Deposit(tokens) => {
            let (market, mut host) = h.act(saver());
            deposit(market, &mut accounts.saver, &mut host, Amount::tokens(tokens)).map(|_| ())
        }
        Op::WithdrawTokens(tokens) => {
            let (market, mut host) = h.act(saver());
            withdraw(market, &mut accounts.saver, &mut host, Amount::tokens(tokens)).map(|_| ())
        }
        Op::WithdrawNotes(notes) => {
            let (market, mut host) = h.act(saver());
            withdraw(market, &mut accounts.saver, &mut host, Amount::deposit_notes(notes)).map(|_| ())
        }
        Op::Borrow(tokens) => {
            let (market, mut host) = h.act(borrower());
            borrow(market, &mut accounts.obligation, USDC, &mut host, Amount::tokens(tokens)).map(|_| ())
        }
        Op::RepayTokens(tokens) => {
            let (market, mut host) = h.act(borrower());
            repay(market, &mut accounts.obligation, USDC, &mut host, Amount::tokens(tokens)).map(|_| ())
        }
        Op::RepayNotes(notes) => {
            let (market, mut host) = h.act(borrower());
            repay(market, &mut accounts.obligation, USDC, &mut host, Amount::loan_notes(notes)).map(|_| ())
        }
        Op::Tick(seconds) => {
            h.tick(seconds);
            Ok(())
        }
        Op::Refresh => {
            let (market, host) = h.act(saver());
            refresh_reserve(market, USDC, &host).map(|_| ())
        }
    }
}

fn usdc_state(h: &Harness) -> ReserveState {
    h.market.reserve(USDC).unwrap().state
}

fn deposit_note_rate(h: &Harness) -> Number {
    h.market.reserve(USDC).unwrap().deposit_note_rate().unwrap()
}

fn usdc_supply(h: &Harness) -> u64 {
    [supplier(), borrower(), saver()]
        .iter()
        .map(|user| h.wallet(user, USDC))
        .sum::<u64>()
        + h.vault_balance(USDC)
}

// ============================================================================
// Accounting Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Recorded liquidity always equals the vault balance and no tokens are
    /// created or destroyed
    #[test]
    fn prop_vault_matches_recorded_liquidity(ops in operations()) {
        let (mut h, mut accounts) = seeded_market();
        let supply = usdc_supply(&h);

        for op in &ops {
            let _ = apply(&mut h, &mut accounts, op);
            let state = usdc_state(&h);
            prop_assert_eq!(state.total_deposits, h.vault_balance(USDC));
            prop_assert_eq!(usdc_supply(&h), supply);
            prop_assert!(state.fee_note_balance <= state.total_deposit_notes);
        }
    }

    /// Depositors' notes never lose value: every operation either leaves the
    /// deposit-note rate alone or raises it
    #[test]
    fn prop_deposit_note_rate_never_decreases(ops in operations()) {
        let (mut h, mut accounts) = seeded_market();
        let mut rate = deposit_note_rate(&h);

        for op in &ops {
            let _ = apply(&mut h, &mut accounts, op);
            let next = deposit_note_rate(&h);
            prop_assert!(next >= rate, "{:?} lowered the rate from {} to {}", op, rate, next);
            rate = next;
        }
    }

    /// A rejected operation leaves the reserve exactly as it was
    #[test]
    fn prop_rejections_write_nothing(ops in operations()) {
        let (mut h, mut accounts) = seeded_market();

        for op in &ops {
            let before = usdc_state(&h);
            let saver_notes = accounts.saver.notes;
            let loan_notes = accounts.obligation.loan_notes(USDC);
            if apply(&mut h, &mut accounts, op).is_err() {
                prop_assert_eq!(usdc_state(&h), before);
                prop_assert_eq!(accounts.saver.notes, saver_notes);
                prop_assert_eq!(accounts.obligation.loan_notes(USDC), loan_notes);
            }
        }
    }

    /// Depositing and immediately withdrawing never returns more than was put
    /// in, however seasoned the reserve
    #[test]
    fn prop_deposit_round_trip_never_profits(
        ops in operations(),
        tokens in 1u64..10_000_000_000,
    ) {
        let (mut h, mut accounts) = seeded_market();
        for op in &ops {
            let _ = apply(&mut h, &mut accounts, op);
        }

        let mut fresh = DepositAccount::new(h.market.id, USDC, supplier());
        let wallet_before = h.wallet(&supplier(), USDC);
        let (market, mut host) = h.act(supplier());
        let Ok(receipt) = deposit(market, &mut fresh, &mut host, Amount::tokens(tokens)) else {
            return Ok(());
        };
        withdraw(market, &mut fresh, &mut host, Amount::deposit_notes(receipt.notes)).unwrap();

        prop_assert_eq!(fresh.notes, 0);
        prop_assert!(h.wallet(&supplier(), USDC) <= wallet_before);
    }

    /// A borrow against 100-priced wsol at the default 125% ratio and 0.1%
    /// origination fee succeeds exactly when `80 × collateral` covers the
    /// loan notes
    #[test]
    fn prop_borrow_gate(
        collateral in 1u64..100_000_000,
        principal in 1u64..10_000_000_000,
    ) {
        let mut h = Harness::new().unwrap();
        h.fund(supplier(), USDC, WALLET);
        h.fund(borrower(), WSOL, WALLET);

        let market_id = h.market.id;
        let mut supply = DepositAccount::new(market_id, USDC, supplier());
        let (market, mut host) = h.act(supplier());
        deposit(market, &mut supply, &mut host, Amount::tokens(BASE_SUPPLY)).unwrap();

        let mut wsol = DepositAccount::new(market_id, WSOL, borrower());
        let mut obligation = Obligation::new(market_id, borrower());
        let (market, mut host) = h.act(borrower());
        deposit(market, &mut wsol, &mut host, Amount::tokens(collateral)).unwrap();
        deposit_collateral(market, &mut obligation, &mut wsol, &mut host, Amount::tokens(collateral)).unwrap();

        let loan_notes = (principal as u128 * 10_010).div_ceil(10_000) as u64;
        let covered = 80 * collateral as u128 >= loan_notes as u128;

        match borrow(market, &mut obligation, USDC, &mut host, Amount::tokens(principal)) {
            Ok(receipt) => {
                prop_assert!(covered);
                prop_assert_eq!(receipt.notes, loan_notes);
            }
            Err(err) => {
                prop_assert!(!covered);
                let is_collateral_error = matches!(err, LendingError::InsufficientCollateral { .. });
                prop_assert!(is_collateral_error);
                prop_assert!(!obligation.has_loans());
            }
        }
    }

    /// Halt flags reject exactly the operations they name, before any state
    /// is touched
    #[test]
    fn prop_halt_gate(flags in halt_flags()) {
        let (mut h, mut accounts) = seeded_market();
        let (market, mut host) = h.act(borrower());
        borrow(market, &mut accounts.obligation, USDC, &mut host, Amount::tokens(1_000_000)).unwrap();
        h.market.set_flags(&owner(), flags).unwrap();

        let usdc_before = usdc_state(&h);
        let wsol_before = h.market.reserve(WSOL).unwrap().state;
        let halted = |result: Result<(), LendingError>| result == Err(LendingError::OperationHalted);

        let (market, mut host) = h.act(saver());
        let outcome = deposit(market, &mut accounts.saver, &mut host, Amount::tokens(1_000)).map(|_| ());
        prop_assert_eq!(halted(outcome), flags.halts_deposits());

        let outcome = withdraw(market, &mut accounts.saver, &mut host, Amount::deposit_notes(1)).map(|_| ());
        prop_assert_eq!(halted(outcome), flags.halts_withdrawals());

        let (market, mut host) = h.act(borrower());
        let outcome = borrow(market, &mut accounts.obligation, USDC, &mut host, Amount::tokens(1_000)).map(|_| ());
        prop_assert_eq!(halted(outcome), flags.halts_borrows());

        let outcome = repay(market, &mut accounts.obligation, USDC, &mut host, Amount::tokens(1_000)).map(|_| ());
        prop_assert_eq!(halted(outcome), flags.halts_repays());

        let outcome = withdraw_collateral(
            market,
            &mut accounts.obligation,
            &mut accounts.borrower_wsol,
            &mut host,
            Amount::tokens(1_000),
        )
        .map(|_| ());
        prop_assert_eq!(halted(outcome), flags.halts_withdrawals());

        let outcome = deposit_collateral(
            market,
            &mut accounts.obligation,
            &mut accounts.borrower_wsol,
            &mut host,
            Amount::deposit_notes(1),
        )
        .map(|_| ());
        prop_assert_eq!(halted(outcome), flags.halts_deposits());

        if flags.is_all() {
            prop_assert_eq!(usdc_state(&h), usdc_before);
            prop_assert_eq!(h.market.reserve(WSOL).unwrap().state, wsol_before);
        }
    }
}
