//! # Accounting State
//!
//! Records mutated by the operation handlers: markets and their reserves,
//! obligations, and free deposit balances.

pub mod deposit_account;
pub mod health;
pub mod market;
pub mod notes;
pub mod obligation;
pub mod reserve;

pub use deposit_account::*;
pub use health::*;
pub use market::*;
pub use notes::collateral_notes;
pub use obligation::*;
pub use reserve::{FeeSweep, Reserve, ReserveSnapshot, ReserveState};
