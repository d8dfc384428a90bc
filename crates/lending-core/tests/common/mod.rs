//! Shared harness for integration tests: a two-reserve market, a price feed,
//! a manual clock and a token ledger that tracks user wallets as well as
//! reserve vaults.

#![allow(dead_code)]

use std::collections::HashMap;

use lending_core::handlers::Host;
use lending_core::{
    Address, Clock, LendingConfig, ManualClock, Market, OraclePrice, ReserveId, StaticPriceFeed, TokenVault,
    VaultError,
};

pub const USDC: ReserveId = ReserveId(0);
pub const WSOL: ReserveId = ReserveId(1);

pub const USDC_PRICE: i64 = 1;
pub const WSOL_PRICE: i64 = 100;

pub const START_TIME: u64 = 1_700_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Token Ledger
// ============================================================================

/// Vault balances plus per-user wallets for every mint
///
/// Transfers move tokens between the acting user's wallet and a vault, so
/// the total supply of each mint is fixed once wallets are funded.
#[derive(Debug, Default)]
pub struct Ledger {
    vault_mints: HashMap<Address, Address>,
    vaults: HashMap<Address, u64>,
    wallets: HashMap<(Address, Address), u64>,
    actor: Address,
}

impl Ledger {
    pub fn vault_balance(&self, vault: &Address) -> u64 {
        self.vaults.get(vault).copied().unwrap_or(0)
    }

    pub fn wallet(&self, user: &Address, mint: &Address) -> u64 {
        self.wallets.get(&(*user, *mint)).copied().unwrap_or(0)
    }

    pub fn fund(&mut self, user: Address, mint: Address, amount: u64) {
        *self.wallets.entry((user, mint)).or_insert(0) += amount;
    }

    fn mint_of(&self, vault: &Address) -> Result<Address, VaultError> {
        self.vault_mints
            .get(vault)
            .copied()
            .ok_or_else(|| VaultError::Host(format!("unknown vault {}", vault)))
    }
}

impl TokenVault for Ledger {
    fn transfer_in(&mut self, vault: &Address, amount: u64) -> Result<(), VaultError> {
        let mint = self.mint_of(vault)?;
        let key = (self.actor, mint);
        let available = self.wallets.get(&key).copied().unwrap_or(0);
        if amount > available {
            return Err(VaultError::Host(format!("wallet holds {}, needs {}", available, amount)));
        }
        self.wallets.insert(key, available - amount);
        *self.vaults.entry(*vault).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_out(&mut self, vault: &Address, amount: u64) -> Result<(), VaultError> {
        let mint = self.mint_of(vault)?;
        let available = self.vault_balance(vault);
        if amount > available {
            return Err(VaultError::InsufficientFunds {
                vault: *vault,
                requested: amount,
                available,
            });
        }
        self.vaults.insert(*vault, available - amount);
        *self.wallets.entry((self.actor, mint)).or_insert(0) += amount;
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub market: Market,
    pub oracle: StaticPriceFeed,
    pub ledger: Ledger,
    pub clock: ManualClock,
}

pub fn market_toml() -> String {
    format!(
        r#"
[market]
id = "{market}"
quote_currency = "{quote}"
owner = "{owner}"
max_price_age = 60

[[reserves]]
name = "usdc"
mint = "{usdc_mint}"
vault = "{usdc_vault}"
oracle = "{usdc_oracle}"
decimals = 6

[[reserves]]
name = "wsol"
mint = "{wsol_mint}"
vault = "{wsol_vault}"
oracle = "{wsol_oracle}"
decimals = 6
"#,
        market = Address::from_seed(1),
        quote = Address::from_seed(2),
        owner = owner(),
        usdc_mint = Address::from_seed(10),
        usdc_vault = Address::from_seed(11),
        usdc_oracle = Address::from_seed(12),
        wsol_mint = Address::from_seed(20),
        wsol_vault = Address::from_seed(21),
        wsol_oracle = Address::from_seed(22),
    )
}

pub fn owner() -> Address {
    Address::from_seed(3)
}

impl Harness {
    pub fn new() -> anyhow::Result<Self> {
        let config = LendingConfig::from_toml_str(&market_toml())?;
        let market = config.build_market(START_TIME)?;

        let mut ledger = Ledger::default();
        for reserve in market.reserves() {
            ledger.vault_mints.insert(reserve.vault, reserve.mint);
        }

        let mut harness = Self {
            market,
            oracle: StaticPriceFeed::new(),
            ledger,
            clock: ManualClock::new(START_TIME),
        };
        harness.publish_prices();
        Ok(harness)
    }

    /// Publish both prices at the current time with a Pyth-style exponent
    pub fn publish_prices(&mut self) {
        self.set_price(USDC, USDC_PRICE * 1_000_000_000);
        self.set_price(WSOL, WSOL_PRICE * 1_000_000_000);
    }

    /// Set a raw price with exponent -9
    pub fn set_price(&mut self, id: ReserveId, raw: i64) {
        let oracle = self.market.reserve(id).map(|r| r.oracle).unwrap_or_default();
        self.oracle
            .set_price(oracle, OraclePrice::new(raw, -9, self.clock.unix_timestamp()));
    }

    /// Advance time and republish fresh prices
    pub fn tick(&mut self, seconds: u64) {
        self.clock.advance(seconds);
        self.publish_prices();
    }

    pub fn mint(&self, id: ReserveId) -> Address {
        self.market.reserve(id).map(|r| r.mint).unwrap_or_default()
    }

    pub fn fund(&mut self, user: Address, id: ReserveId, amount: u64) {
        let mint = self.mint(id);
        self.ledger.fund(user, mint, amount);
    }

    pub fn wallet(&self, user: &Address, id: ReserveId) -> u64 {
        self.ledger.wallet(user, &self.mint(id))
    }

    pub fn vault_balance(&self, id: ReserveId) -> u64 {
        let vault = self.market.reserve(id).map(|r| r.vault).unwrap_or_default();
        self.ledger.vault_balance(&vault)
    }

    /// Split borrows of the market and a host acting for `user`
    pub fn act(&mut self, user: Address) -> (&mut Market, Host<'_>) {
        self.ledger.actor = user;
        let host = Host::new(&self.oracle, &mut self.ledger, &self.clock);
        (&mut self.market, host)
    }

    /// Every reserve's recorded liquidity matches its vault
    pub fn assert_vaults_match(&self) {
        for reserve in self.market.reserves() {
            assert_eq!(
                reserve.state.total_deposits,
                self.ledger.vault_balance(&reserve.vault),
                "reserve {} out of sync with its vault",
                reserve.id
            );
        }
    }
}
