//! # Oracle Price Feed
//!
//! Prices are consumed read-only through [`PriceFeed`]. A raw
//! [`OraclePrice`] carries a mantissa and a base-10 exponent (as published by
//! Pyth-style feeds) and is converted to a [`Number`] quote-currency price per
//! whole token before any valuation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::NUMBER_DECIMALS;
use crate::errors::{LendingError, LendingResult};
use crate::math::{mul_div, pow10, safe_mul_u128, Number, Rounding};
use crate::types::Address;

/// Raw price as published by a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePrice {
    /// Price mantissa
    pub price: i64,
    /// Base-10 exponent applied to `price` and `confidence`
    pub exponent: i32,
    /// Confidence interval, same scale as `price`
    pub confidence: u64,
    /// Unix timestamp of publication
    pub publish_time: u64,
}

impl OraclePrice {
    pub fn new(price: i64, exponent: i32, publish_time: u64) -> Self {
        Self {
            price,
            exponent,
            confidence: 0,
            publish_time,
        }
    }

    /// Whole-unit price, e.g. `from_whole(100, 0)` is 100 quote per token
    pub fn from_whole(price: i64, publish_time: u64) -> Self {
        Self::new(price, 0, publish_time)
    }

    /// Quote-currency value of one whole token at 1e15 scale
    pub fn to_number(&self) -> LendingResult<Number> {
        if self.price <= 0 {
            return Err(LendingError::InvalidAmount("oracle price must be positive"));
        }

        let mantissa = self.price as u128;
        let shift = NUMBER_DECIMALS as i64 + self.exponent as i64;
        let scaled = if shift >= 0 {
            let shift = u32::try_from(shift).map_err(|_| LendingError::ArithmeticOverflow)?;
            safe_mul_u128(mantissa, pow10(shift)?)?
        } else {
            let shift = u32::try_from(-shift).map_err(|_| LendingError::ArithmeticOverflow)?;
            match pow10(shift) {
                Ok(divisor) => mul_div(mantissa, 1, divisor, Rounding::Down)?,
                // Below 1e-38 of the quote unit, indistinguishable from zero
                Err(_) => 0,
            }
        };

        if scaled == 0 {
            return Err(LendingError::InvalidAmount("oracle price rounds to zero"));
        }
        Ok(Number::from_scaled(scaled))
    }

    /// Seconds since publication, zero if published in the future
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.publish_time)
    }

    pub fn is_stale(&self, now: u64, max_age: u64) -> bool {
        self.age(now) > max_age
    }
}

/// Read-only source of prices keyed by oracle account
pub trait PriceFeed {
    fn get_price(&self, oracle: &Address) -> Option<OraclePrice>;
}

/// Resolve a usable price, or `None` when it is missing, stale or invalid
pub fn fresh_price(feed: &dyn PriceFeed, oracle: &Address, now: u64, max_age: u64) -> Option<Number> {
    let Some(price) = feed.get_price(oracle) else {
        warn!(%oracle, "oracle price missing");
        return None;
    };

    if price.is_stale(now, max_age) {
        warn!(%oracle, age = price.age(now), max_age, "oracle price stale");
        return None;
    }

    match price.to_number() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%oracle, %err, "oracle price unusable");
            None
        }
    }
}

/// In-memory feed for simulations and tests
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    prices: HashMap<Address, OraclePrice>,
}

impl StaticPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, oracle: Address, price: OraclePrice) {
        self.prices.insert(oracle, price);
    }

    pub fn remove_price(&mut self, oracle: &Address) -> Option<OraclePrice> {
        self.prices.remove(oracle)
    }
}

impl PriceFeed for StaticPriceFeed {
    fn get_price(&self, oracle: &Address) -> Option<OraclePrice> {
        self.prices.get(oracle).copied()
    }
}
