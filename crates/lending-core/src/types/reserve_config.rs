//! # Reserve Configuration
//!
//! Interest curve, collateral and fee parameters of a single reserve. All
//! ratios are basis points (10,000 = 100%). A configuration is validated
//! when a reserve is registered and whenever the market owner replaces it.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BPS_DENOMINATOR, MAX_BORROW_RATE_BPS, MAX_LIQUIDATION_PREMIUM_BPS, MAX_LOAN_ORIGINATION_FEE_BPS,
    MIN_COLLATERAL_RATIO_FLOOR_BPS,
};
use crate::errors::{LendingError, LendingResult};

/// Parameters of one reserve
///
/// Fields missing from a serialized configuration take their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReserveConfig {
    /// First utilization breakpoint of the rate curve
    pub utilization_rate_1: u64,
    /// Second utilization breakpoint of the rate curve
    pub utilization_rate_2: u64,

    /// Annual borrow rate at 0% utilization
    pub borrow_rate_0: u64,
    /// Annual borrow rate at `utilization_rate_1`
    pub borrow_rate_1: u64,
    /// Annual borrow rate at `utilization_rate_2`
    pub borrow_rate_2: u64,
    /// Annual borrow rate at 100% utilization
    pub borrow_rate_3: u64,

    /// Minimum ratio of collateral value to loan value
    pub min_collateral_ratio: u64,

    /// Bonus paid to liquidators on seized collateral
    pub liquidation_premium: u64,
    /// Maximum slippage tolerated by the external liquidation venue
    pub liquidation_slippage: u64,
    /// Largest token amount the external venue may trade per liquidation
    pub liquidation_dex_trade_max: u64,

    /// Protocol share of accrued interest
    pub manage_fee_rate: u64,
    /// Whole tokens of uncollected fees required before a sweep
    pub manage_fee_collection_threshold: u64,

    /// Fee added to borrowed principal when loan notes are minted
    pub loan_origination_fee: u64,
}

/// Parameters handed to the external liquidation venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexLiquidationLimits {
    pub slippage_bps: u64,
    pub trade_max_tokens: u64,
}

impl ReserveConfig {
    /// Check every field against its allowed range
    pub fn validate(&self) -> LendingResult<()> {
        if self.utilization_rate_1 >= self.utilization_rate_2 {
            return Err(LendingError::invalid_config(
                "utilization_rate_1",
                "must be below utilization_rate_2",
            ));
        }

        if self.utilization_rate_2 > BPS_DENOMINATOR {
            return Err(LendingError::invalid_config("utilization_rate_2", "must be at most 10000"));
        }

        let rates = self.borrow_rates();
        if rates.iter().any(|rate| *rate > MAX_BORROW_RATE_BPS) {
            return Err(LendingError::invalid_config("borrow_rate", "exceeds maximum annual rate"));
        }

        if rates.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(LendingError::invalid_config("borrow_rate", "must not decrease with utilization"));
        }

        if self.min_collateral_ratio < MIN_COLLATERAL_RATIO_FLOOR_BPS {
            return Err(LendingError::invalid_config("min_collateral_ratio", "must be at least 10000"));
        }

        if self.liquidation_premium > MAX_LIQUIDATION_PREMIUM_BPS {
            return Err(LendingError::invalid_config("liquidation_premium", "must be at most 5000"));
        }

        if self.liquidation_slippage > BPS_DENOMINATOR {
            return Err(LendingError::invalid_config("liquidation_slippage", "must be at most 10000"));
        }

        if self.manage_fee_rate > BPS_DENOMINATOR {
            return Err(LendingError::invalid_config("manage_fee_rate", "must be at most 10000"));
        }

        if self.loan_origination_fee > MAX_LOAN_ORIGINATION_FEE_BPS {
            return Err(LendingError::invalid_config("loan_origination_fee", "must be at most 1000"));
        }

        Ok(())
    }

    /// Borrow rates at the four curve anchors
    pub fn borrow_rates(&self) -> [u64; 4] {
        [self.borrow_rate_0, self.borrow_rate_1, self.borrow_rate_2, self.borrow_rate_3]
    }

    /// Utilization at the four curve anchors
    pub fn utilization_anchors(&self) -> [u64; 4] {
        [0, self.utilization_rate_1, self.utilization_rate_2, BPS_DENOMINATOR]
    }

    pub fn dex_liquidation_limits(&self) -> DexLiquidationLimits {
        DexLiquidationLimits {
            slippage_bps: self.liquidation_slippage,
            trade_max_tokens: self.liquidation_dex_trade_max,
        }
    }
}

impl Default for ReserveConfig {
    fn default() -> Self {
        Self {
            utilization_rate_1: 8_500,
            utilization_rate_2: 9_500,
            borrow_rate_0: 20_000,
            borrow_rate_1: 20_000,
            borrow_rate_2: 20_000,
            borrow_rate_3: 20_000,
            min_collateral_ratio: 12_500,
            liquidation_premium: 100,
            liquidation_slippage: 300,
            liquidation_dex_trade_max: 100,
            manage_fee_rate: 50,
            manage_fee_collection_threshold: 10,
            loan_origination_fee: 10,
        }
    }
}
