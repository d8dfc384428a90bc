//! # Market Configuration
//!
//! A market and its reserves described as a TOML document:
//!
//! ```toml
//! [market]
//! id = "..."
//! quote_currency = "..."
//! owner = "..."
//! max_price_age = 60
//!
//! [[reserves]]
//! name = "usdc"
//! mint = "..."
//! vault = "..."
//! oracle = "..."
//! decimals = 6
//!
//! [reserves.config]
//! min_collateral_ratio = 12500
//! ```
//!
//! Omitted reserve parameters take the [`ReserveConfig`] defaults.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{DEFAULT_MAX_PRICE_AGE_SECS, MAX_TOKEN_DECIMALS};
use crate::errors::{LendingError, LendingResult};
use crate::state::{Market, ReserveAccounts};
use crate::types::{Address, MarketFlags, ReserveConfig};

/// Market configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingConfig {
    pub market: MarketSettings,
    pub reserves: Vec<ReserveSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSettings {
    pub id: Address,
    pub quote_currency: Address,
    pub owner: Address,

    /// Oldest oracle price accepted (seconds)
    #[serde(default = "default_max_price_age")]
    pub max_price_age: u64,

    /// Halt flags in effect when the market is built
    #[serde(default)]
    pub flags: MarketFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSettings {
    /// Name for logging
    pub name: String,
    pub mint: Address,
    pub vault: Address,
    pub oracle: Address,
    pub decimals: u8,
    #[serde(default)]
    pub config: ReserveConfig,
}

fn default_max_price_age() -> u64 {
    DEFAULT_MAX_PRICE_AGE_SECS
}

impl LendingConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> LendingResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LendingError::InvalidConfig(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> LendingResult<Self> {
        let config: LendingConfig = toml::from_str(content)
            .map_err(|e| LendingError::InvalidConfig(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> LendingResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LendingError::InvalidConfig(format!("failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> LendingResult<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|e| {
            LendingError::InvalidConfig(format!("failed to write config file {}: {}", path.display(), e))
        })
    }

    pub fn validate(&self) -> LendingResult<()> {
        if self.market.max_price_age == 0 {
            return Err(LendingError::invalid_config("max_price_age", "must be greater than 0"));
        }

        if self.reserves.is_empty() {
            return Err(LendingError::invalid_config("reserves", "at least one reserve is required"));
        }

        let mut names = HashSet::new();
        let mut mints = HashSet::new();
        for reserve in &self.reserves {
            reserve.validate()?;
            if !names.insert(reserve.name.as_str()) {
                return Err(LendingError::InvalidConfig(format!("duplicate reserve name {}", reserve.name)));
            }
            if !mints.insert(reserve.mint) {
                return Err(LendingError::InvalidConfig(format!("duplicate mint for reserve {}", reserve.name)));
            }
        }

        Ok(())
    }

    /// Build the market with every reserve registered, in file order
    pub fn build_market(&self, now: u64) -> LendingResult<Market> {
        let settings = &self.market;
        let mut market = Market::new(settings.id, settings.quote_currency, settings.owner)
            .with_max_price_age(settings.max_price_age);

        for reserve in &self.reserves {
            let id = market.register_reserve(&settings.owner, reserve.accounts(), reserve.config, now)?;
            info!(market = %settings.id, reserve = %id, name = %reserve.name, "configured reserve");
        }

        market.set_flags(&settings.owner, settings.flags)?;
        Ok(market)
    }
}

impl ReserveSettings {
    fn validate(&self) -> LendingResult<()> {
        if self.name.is_empty() {
            return Err(LendingError::invalid_config("name", "must not be empty"));
        }
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(LendingError::InvalidConfig(format!(
                "reserve {}: decimals must be at most {}",
                self.name, MAX_TOKEN_DECIMALS
            )));
        }
        self.config
            .validate()
            .map_err(|e| LendingError::InvalidConfig(format!("reserve {}: {}", self.name, e)))
    }

    pub fn accounts(&self) -> ReserveAccounts {
        ReserveAccounts {
            mint: self.mint,
            vault: self.vault,
            oracle: self.oracle,
            decimals: self.decimals,
        }
    }
}
