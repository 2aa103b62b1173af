//! Core type definitions for the depositor

use std::fmt;

use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

pub use alloy_primitives::{Address, TxHash, U256};

/// EVM network, resolved from the node's chain id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Holesky,
    Sepolia,
    Custom(u64),
}

impl Network {
    pub fn from_chain_id(chain_id: u64) -> Self {
        match chain_id {
            1 => Self::Mainnet,
            17_000 => Self::Holesky,
            11_155_111 => Self::Sepolia,
            other => Self::Custom(other),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Holesky => write!(f, "holesky"),
            Self::Sepolia => write!(f, "sepolia"),
            Self::Custom(id) => write!(f, "chain-{}", id),
        }
    }
}

/// Block number
pub type BlockNumber = u64;

/// Parse a human-readable amount ("0.005") into the token's smallest unit.
///
/// Negative amounts are rejected; zero parses fine and is left to callers
/// that need a strictly positive value.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ProtocolError> {
    match parse_units(amount.trim(), decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(ProtocolError::InvalidAmount {
            message: format!("amount must not be negative: {}", amount),
        }),
        Err(e) => Err(ProtocolError::InvalidAmount {
            message: format!("cannot parse '{}' with {} decimals: {}", amount, decimals, e),
        }),
    }
}

/// Format a smallest-unit amount for display, e.g. `5000000000000000` -> `"0.005000000000000000"`.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}

/// Constants
pub mod constants {
    /// Decimals of ETH-like assets and of the receipt token
    pub const DEFAULT_DECIMALS: u8 = 18;

    /// Basis-point denominator (100%)
    pub const BPS_DENOM: u16 = 10_000;

    /// Default deposit amount used by the deposit script
    pub const DEFAULT_DEPOSIT_AMOUNT: &str = "0.005";
}
