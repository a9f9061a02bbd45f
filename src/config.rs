//! Machine configuration.
//!
//! Defaults describe a small machine stocked with three products. Any of the
//! cash settings can be overridden from the environment:
//!
//! - `VEND_DENOMINATIONS`: comma separated face values, e.g. `100,50,10,5,2,1`
//! - `VEND_BANK_SEED`: comma separated `DENOM:COUNT` pairs, e.g. `10:5,5:5`
//! - `VEND_ADMIN_PIN`: shared secret for admin commands

use std::env;

use thiserror::Error;

use crate::Amount;
use crate::model::{Coins, Count, Denomination};

pub const DENOMINATIONS_VAR: &str = "VEND_DENOMINATIONS";
pub const BANK_SEED_VAR: &str = "VEND_BANK_SEED";
pub const ADMIN_PIN_VAR: &str = "VEND_ADMIN_PIN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid entry '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("no denominations configured")]
    NoDenominations,

    #[error("denomination must be positive")]
    ZeroDenomination,

    #[error("admin pin is empty")]
    EmptyPin,
}

/// A product stocked at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSeed {
    pub name: String,
    pub price: Amount,
    pub quantity: Count,
}

impl ProductSeed {
    pub fn new(name: impl Into<String>, price: u64, quantity: Count) -> Self {
        Self {
            name: name.into(),
            price: Amount::new(price),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Legal denominations, in any order.
    pub denominations: Vec<Denomination>,
    /// Coins in the bank at startup.
    pub bank_seed: Coins,
    pub products: Vec<ProductSeed>,
    pub admin_pin: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            denominations: vec![100, 50, 10, 5, 2, 1],
            bank_seed: Coins::from([(100, 0), (50, 0), (10, 5), (5, 5), (2, 0), (1, 0)]),
            products: vec![
                ProductSeed::new("Cola", 15, 10),
                ProductSeed::new("Chips", 25, 5),
                ProductSeed::new("Candy", 10, 8),
            ],
            admin_pin: "1234".to_string(),
        }
    }
}

impl MachineConfig {
    /// Defaults overridden by whichever `VEND_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(DENOMINATIONS_VAR) {
            config.denominations = parse_denominations(&value)?;
        }
        if let Some(value) = lookup(BANK_SEED_VAR) {
            config.bank_seed = parse_coins(BANK_SEED_VAR, &value)?;
        }
        if let Some(value) = lookup(ADMIN_PIN_VAR) {
            config.admin_pin = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.denominations.is_empty() {
            return Err(ConfigError::NoDenominations);
        }
        if self.denominations.contains(&0) {
            return Err(ConfigError::ZeroDenomination);
        }
        if self.admin_pin.is_empty() {
            return Err(ConfigError::EmptyPin);
        }
        Ok(())
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse_denominations(value: &str) -> Result<Vec<Denomination>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Denomination>()
                .map_err(|_| invalid(DENOMINATIONS_VAR, s))
        })
        .collect()
}

fn parse_coins(var: &'static str, value: &str) -> Result<Coins, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| -> Result<(Denomination, Count), ConfigError> {
            let (denomination, count) = entry.split_once(':').ok_or_else(|| invalid(var, entry))?;
            let denomination = denomination
                .trim()
                .parse::<Denomination>()
                .map_err(|_| invalid(var, entry))?;
            let count = count
                .trim()
                .parse::<Count>()
                .map_err(|_| invalid(var, entry))?;
            Ok((denomination, count))
        })
        .collect()
}
