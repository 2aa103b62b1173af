//! Deposit State Types
//!
//! Quote, request, handle and outcome types for one deposit operation, plus
//! the flow's error taxonomy.

use std::fmt;
use std::time::Duration;

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, TxHash, U256};
use lrt_core::constants::BPS_DENOM;
use lrt_core::{ConfirmationConfig, DepositConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::calculator;
use crate::constants::{
    DEFAULT_CONFIRMATIONS, DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_MAX_QUOTE_AGE,
    DEFAULT_POLL_INTERVAL, NO_REFERRAL,
};

/// Point-in-time answer of the pool's mint quote
#[derive(Debug, Clone)]
pub struct Quote {
    pub asset: Address,
    pub deposit_amount: U256,
    /// Receipt tokens the pool would mint right now
    pub mint_amount: U256,
    pub fetched_at: Instant,
}

impl Quote {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Read-only preview of a deposit (quote plus the floor that would be submitted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPreview {
    pub asset: Address,
    pub deposit_amount: U256,
    pub quoted_mint_amount: U256,
    pub min_amount_out: U256,
    pub slippage_bps: u16,
    pub referral_id: u64,
}

/// The four fields submitted in one deposit transaction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    asset: Address,
    amount: U256,
    min_amount_out: U256,
    referral_id: u64,
}

impl DepositRequest {
    /// Validate and build a request
    pub fn new(
        asset: Address,
        amount: U256,
        min_amount_out: U256,
        referral_id: u64,
    ) -> Result<Self, DepositError> {
        check_inputs(asset, amount)?;
        Ok(Self {
            asset,
            amount,
            min_amount_out,
            referral_id,
        })
    }

    /// Build a request whose floor is derived from `quote`.
    ///
    /// The quote must be younger than `max_age`; the floor is the only
    /// protection against the price moving between quote and inclusion.
    pub fn from_quote(
        quote: &Quote,
        slippage_bps: u16,
        referral_id: u64,
        max_age: Duration,
    ) -> Result<Self, DepositError> {
        let age = quote.age();
        if age > max_age {
            return Err(DepositError::QuoteUnavailable {
                reason: format!(
                    "quote is stale ({}ms old, limit {}ms)",
                    age.as_millis(),
                    max_age.as_millis()
                ),
            });
        }

        let min_amount_out = calculator::minimum_output(quote.mint_amount, slippage_bps);
        Self::new(quote.asset, quote.deposit_amount, min_amount_out, referral_id)
    }

    pub fn asset(&self) -> Address {
        self.asset
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn min_amount_out(&self) -> U256 {
        self.min_amount_out
    }

    pub fn referral_id(&self) -> u64 {
        self.referral_id
    }
}

/// Local checks every deposit must pass before the node is contacted
pub fn check_inputs(asset: Address, amount: U256) -> Result<(), DepositError> {
    if asset == Address::ZERO {
        return Err(DepositError::InvalidRequest(
            "asset address must not be zero".to_string(),
        ));
    }
    if amount.is_zero() {
        return Err(DepositError::InvalidRequest(
            "deposit amount must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Tolerance may not exceed the whole quote
pub fn check_slippage(slippage_bps: u16) -> Result<(), DepositError> {
    if slippage_bps > BPS_DENOM {
        return Err(DepositError::InvalidRequest(format!(
            "slippage of {slippage_bps} bps exceeds {BPS_DENOM} bps"
        )));
    }
    Ok(())
}

/// A broadcast deposit that has not been resolved yet
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    pub tx_hash: TxHash,
    pub sender: Address,
    pub request: DepositRequest,
    /// The unsigned call, kept to replay a revert for its reason
    pub call: TransactionRequest,
    pub submitted_at: Instant,
}

/// Confirmed deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub confirmations: u64,
    pub gas_used: u64,
    pub asset: Address,
    pub deposit_amount: U256,
    pub min_amount_out: U256,
    pub referral_id: u64,
    /// From the pool's `AssetDeposit` event; `None` when the log was not found
    pub minted_amount: Option<U256>,
}

/// Terminal result of one deposit operation
pub type DepositOutcome = Result<DepositReceipt, DepositError>;

/// Lifecycle of one deposit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStage {
    Init,
    Quoted,
    Submitted,
    Confirmed,
    Reverted,
    Rejected,
    TimedOut,
}

impl DepositStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Quoted => "QUOTED",
            Self::Submitted => "SUBMITTED",
            Self::Confirmed => "CONFIRMED",
            Self::Reverted => "REVERTED",
            Self::Rejected => "REJECTED",
            Self::TimedOut => "TIMED_OUT",
        }
    }
}

impl fmt::Display for DepositStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deposit flow errors
#[derive(Debug, Error)]
pub enum DepositError {
    #[error("Invalid deposit request: {0}")]
    InvalidRequest(String),

    #[error("Quote unavailable: {reason}")]
    QuoteUnavailable { reason: String },

    #[error("Submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Deposit {tx_hash} reverted: {reason}")]
    DepositReverted { tx_hash: TxHash, reason: String },

    /// The transaction may still be included later
    #[error("Deposit {tx_hash} not confirmed within {waited_secs}s")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },
}

impl DepositError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::QuoteUnavailable { .. } => "quote_unavailable",
            Self::SubmissionRejected { .. } => "submission_rejected",
            Self::DepositReverted { .. } => "deposit_reverted",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
        }
    }

    /// Stage the operation ended in
    pub fn stage(&self) -> DepositStage {
        match self {
            Self::InvalidRequest(_) | Self::QuoteUnavailable { .. } => DepositStage::Init,
            Self::SubmissionRejected { .. } => DepositStage::Rejected,
            Self::DepositReverted { .. } => DepositStage::Reverted,
            Self::ConfirmationTimeout { .. } => DepositStage::TimedOut,
        }
    }

    /// Whether a new operation can succeed without changing the inputs
    /// (retry later, re-poll), as opposed to needing different inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::QuoteUnavailable { .. } | Self::ConfirmationTimeout { .. }
        )
    }

    /// Hash of the broadcast transaction, if the failure happened after broadcast
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::DepositReverted { tx_hash, .. } | Self::ConfirmationTimeout { tx_hash, .. } => {
                Some(*tx_hash)
            }
            _ => None,
        }
    }
}

/// Per-deposit knobs
#[derive(Debug, Clone)]
pub struct DepositSettings {
    pub slippage_bps: u16,
    pub referral_id: u64,
    pub max_quote_age: Duration,
}

impl Default for DepositSettings {
    fn default() -> Self {
        Self {
            slippage_bps: 0,
            referral_id: NO_REFERRAL,
            max_quote_age: DEFAULT_MAX_QUOTE_AGE,
        }
    }
}

impl From<&DepositConfig> for DepositSettings {
    fn from(config: &DepositConfig) -> Self {
        Self {
            slippage_bps: config.slippage_bps,
            referral_id: config.referral_id,
            max_quote_age: Duration::from_secs(config.max_quote_age_secs),
        }
    }
}

/// How long and how deep to wait for a broadcast deposit
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    /// At least 1
    pub confirmations: u64,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

impl From<&ConfirmationConfig> for ConfirmationPolicy {
    fn from(config: &ConfirmationConfig) -> Self {
        Self {
            confirmations: config.confirmations.max(1),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}
