//! Revert reason decoding
//!
//! Turns a revert payload into the string reported to the caller: the pool's
//! custom error name, an `Error(string)` message, a `Panic(uint256)`
//! description, or the raw hex as a last resort.

use alloy::sol_types::{Panic, Revert, SolError, SolInterface};
use lrt_core::NodeError;

use crate::constants::ILRTDepositPool::ILRTDepositPoolErrors;

/// Decode a revert payload returned by the EVM
pub fn decode_revert_reason(data: &[u8]) -> String {
    if data.is_empty() {
        return "execution reverted without reason".to_string();
    }

    if let Ok(err) = ILRTDepositPoolErrors::abi_decode(data) {
        return pool_error_name(&err).to_string();
    }

    if let Ok(revert) = Revert::abi_decode(data) {
        return revert.reason;
    }

    if let Ok(panic) = Panic::abi_decode(data) {
        return panic.to_string();
    }

    format!("0x{}", hex::encode(data))
}

/// Reason string for a failed node call, decoding the revert payload when there is one
pub fn describe_node_error(err: &NodeError) -> String {
    match err {
        NodeError::ExecutionReverted {
            data: Some(data), ..
        } if !data.is_empty() => decode_revert_reason(data),
        NodeError::ExecutionReverted { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn pool_error_name(err: &ILRTDepositPoolErrors) -> &'static str {
    match err {
        ILRTDepositPoolErrors::TokenNotSupported(_) => "TokenNotSupported",
        ILRTDepositPoolErrors::InvalidAmountToDeposit(_) => "InvalidAmountToDeposit",
        ILRTDepositPoolErrors::MaximumDepositLimitReached(_) => "MaximumDepositLimitReached",
        ILRTDepositPoolErrors::MinimumAmountToReceiveNotMet(_) => "MinimumAmountToReceiveNotMet",
        ILRTDepositPoolErrors::EnforcedPause(_) => "EnforcedPause",
    }
}
