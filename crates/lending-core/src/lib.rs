//! # Lending Core - Reserve & Obligation Accounting
//!
//! This crate contains the accounting engine of a collateralized lending
//! market. It is host-agnostic: token custody, price data and time are
//! consumed through the [`PriceFeed`], [`TokenVault`] and [`Clock`] traits,
//! and every operation is an atomic transition over [`Market`],
//! [`Obligation`] and [`DepositAccount`] records owned by the caller.
//!
//! It provides:
//!
//! - Fixed-point ledger primitives (1e15 scale, 256-bit `mul_div`)
//! - Reserve state with deposit-note / loan-note accounting
//! - A four-anchor piecewise-linear interest model with fee accrual
//! - Cross-reserve obligation health checks
//! - Operation handlers with market halt flags and owner controls
//! - TOML market configuration

pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod interest;
pub mod math;
pub mod oracle;
pub mod state;
pub mod types;
pub mod vault;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LendingConfig;
pub use constants::*;
pub use errors::{LendingError, LendingResult};
pub use handlers::{Host, OperationReceipt};
pub use math::{Number, Rounding};
pub use oracle::{OraclePrice, PriceFeed, StaticPriceFeed};
pub use state::*;
pub use types::*;
pub use vault::{InMemoryVault, TokenVault, VaultError};
