//! Configuration types for the depositor

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::{BPS_DENOM, DEFAULT_DECIMALS, DEFAULT_DEPOSIT_AMOUNT};
use crate::errors::ConfigError;

/// Node connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// JSON-RPC URL (e.g., "http://127.0.0.1:8545")
    pub url: String,

    /// Per-request timeout for node calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// What to deposit and where
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositConfig {
    /// Deposit pool contract
    pub pool_address: Option<Address>,

    /// Whitelisted asset to deposit
    pub asset_address: Option<Address>,

    /// Human-readable amount, scaled by `decimals`
    pub amount: String,

    pub decimals: u8,

    /// Allowed shortfall below the quote, in basis points (0 = the full quote)
    pub slippage_bps: u16,

    /// Referral attribution (0 = none)
    pub referral_id: u64,

    /// Oldest quote the submitter will still build a deposit from
    pub max_quote_age_secs: u64,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            pool_address: None,
            asset_address: None,
            amount: DEFAULT_DEPOSIT_AMOUNT.to_string(),
            decimals: DEFAULT_DECIMALS,
            slippage_bps: 0,
            referral_id: 0,
            max_quote_age_secs: 60,
        }
    }
}

/// Confirmation tracking policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Blocks (inclusion block counted) before a deposit is final
    pub confirmations: u64,

    pub poll_interval_secs: u64,

    /// Give up waiting after this long; the transaction may still land
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval_secs: 2,
            timeout_secs: 120,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Node connection settings
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub deposit: DepositConfig,

    #[serde(default)]
    pub confirmation: ConfirmationConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Check the settings every deposit needs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.url.trim().is_empty() {
            return Err(ConfigError::Missing { field: "node.url" });
        }

        match self.deposit.pool_address {
            None => return Err(ConfigError::Missing { field: "deposit.pool_address" }),
            Some(addr) if addr == Address::ZERO => {
                return Err(ConfigError::Invalid {
                    field: "deposit.pool_address",
                    reason: "zero address".to_string(),
                })
            }
            Some(_) => {}
        }

        match self.deposit.asset_address {
            None => return Err(ConfigError::Missing { field: "deposit.asset_address" }),
            Some(addr) if addr == Address::ZERO => {
                return Err(ConfigError::Invalid {
                    field: "deposit.asset_address",
                    reason: "zero address".to_string(),
                })
            }
            Some(_) => {}
        }

        if self.deposit.slippage_bps > BPS_DENOM {
            return Err(ConfigError::Invalid {
                field: "deposit.slippage_bps",
                reason: format!("{} exceeds {}", self.deposit.slippage_bps, BPS_DENOM),
            });
        }

        if self.confirmation.confirmations == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation.confirmations",
                reason: "at least one confirmation is required".to_string(),
            });
        }

        if self.confirmation.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation.timeout_secs",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}
