//! LRT Deposit Pool
//!
//! Deposits a whitelisted asset into a liquid-restaking deposit pool and
//! reports the outcome.
//!
//! # Flow
//!
//! - Quote: `getNovETHAmountToMint(asset, amount)` via `eth_call`
//! - Floor: `min_out = quote - quote * slippage_bps / 10_000`
//! - Submit: `depositAsset(asset, amount, min_out, referralId)`, signed and broadcast
//! - Confirm: poll the receipt until the required depth, a revert, or the deadline
//!
//! # Example
//!
//! ```ignore
//! use deposit_pool::{ConfirmationPolicy, DepositOrchestrator, DepositSettings};
//!
//! let orchestrator = DepositOrchestrator::new(
//!     node_client,
//!     signer,
//!     pool,
//!     DepositSettings::default(),
//!     ConfirmationPolicy::default(),
//! );
//! let receipt = orchestrator.deposit(asset, amount).await?;
//! println!("minted {:?} in {}", receipt.minted_amount, receipt.tx_hash);
//! ```

pub mod calculator;
pub mod confirmation;
pub mod constants;
pub mod fetch;
pub mod orchestrator;
pub mod revert;
pub mod state;
pub mod tx_builder;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use calculator::minimum_output;
pub use confirmation::await_confirmation;
pub use constants::ILRTDepositPool;
pub use fetch::{fetch_quote, preview_deposit};
pub use orchestrator::DepositOrchestrator;
pub use revert::decode_revert_reason;
pub use state::{
    ConfirmationPolicy, DepositError, DepositOutcome, DepositPreview, DepositReceipt,
    DepositRequest, DepositSettings, DepositStage, Quote, TransactionHandle,
};
pub use tx_builder::submit_deposit;
