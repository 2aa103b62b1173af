//! Deposit Transaction Builder
//!
//! Encodes `depositAsset` and submits it.
//!
//! # Submission steps
//!
//! 1. calldata: `depositAsset(asset, amount, minAmountOut, referralId)`
//! 2. fill: chain id, pending nonce of the signer, gas estimate + buffer, EIP-1559 fees
//! 3. sign (signer) and broadcast (node); return as soon as the node accepts
//!
//! A revert during gas estimation is a pre-inclusion rejection, so it is
//! reported as `SubmissionRejected`, not `DepositReverted`.
//!
//! The transaction hash is the keccak of the signed envelope and is known
//! before broadcast. If the broadcast gets no answer (timeout, connection
//! lost) the node may already hold the transaction, so the handle is still
//! returned and the confirmation tracker decides the outcome.

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy_primitives::{keccak256, Address, Bytes, U256};
use evm_node_client::{ChainClient, TxSigner};
use lrt_core::NodeError;
use tokio::time::Instant;

use crate::calculator;
use crate::constants::ILRTDepositPool;
use crate::revert;
use crate::state::{DepositError, DepositRequest, TransactionHandle};

/// ABI-encode the deposit call
pub fn encode_deposit_call(request: &DepositRequest) -> Bytes {
    ILRTDepositPool::depositAssetCall {
        asset: request.asset(),
        depositAmount: request.amount(),
        minNovETHAmountExpected: request.min_amount_out(),
        referralId: U256::from(request.referral_id()),
    }
    .abi_encode()
    .into()
}

/// Build the unsigned deposit call from `from` to the pool (no nonce, gas or fees yet)
pub fn build_deposit_tx(
    pool: Address,
    request: &DepositRequest,
    from: Address,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(from)
        .with_to(pool)
        .with_value(U256::ZERO)
        .with_input(encode_deposit_call(request))
}

/// Sign and broadcast a deposit. Does not wait for inclusion.
pub async fn submit_deposit<C, S>(
    client: &C,
    signer: &S,
    pool: Address,
    request: DepositRequest,
) -> Result<TransactionHandle, DepositError>
where
    C: ChainClient + ?Sized,
    S: TxSigner + ?Sized,
{
    let sender = signer.address();
    let call = build_deposit_tx(pool, &request, sender);

    let chain_id = client.chain_id().await.map_err(rejected)?;
    let nonce = client.pending_nonce(sender).await.map_err(rejected)?;
    let gas_estimate = client.estimate_gas(call.clone()).await.map_err(rejected)?;
    let fees = client.fee_estimate().await.map_err(rejected)?;

    let gas_limit = calculator::gas_limit_with_buffer(gas_estimate);

    let filled = call
        .clone()
        .with_chain_id(chain_id)
        .with_nonce(nonce)
        .with_gas_limit(gas_limit)
        .with_max_fee_per_gas(fees.max_fee_per_gas)
        .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);

    tracing::debug!(
        %sender,
        nonce,
        gas_limit,
        max_fee_per_gas = fees.max_fee_per_gas,
        "Signing deposit transaction"
    );

    let raw = signer
        .sign_transaction(filled)
        .await
        .map_err(|e| DepositError::SubmissionRejected {
            reason: e.to_string(),
        })?;

    let tx_hash = keccak256(&raw);

    match client.send_raw_transaction(raw).await {
        Ok(returned) if returned != tx_hash => {
            tracing::warn!(%tx_hash, %returned, "Node returned a different transaction hash");
        }
        Ok(_) => {}
        Err(e) if e.is_no_response() => {
            tracing::warn!(
                %tx_hash,
                code = e.error_code(),
                "No answer to broadcast, tracking the transaction anyway: {}",
                e
            );
        }
        Err(e) => return Err(rejected(e)),
    }

    tracing::info!(
        %tx_hash,
        asset = %request.asset(),
        amount = %request.amount(),
        min_amount_out = %request.min_amount_out(),
        referral_id = request.referral_id(),
        "Deposit transaction submitted"
    );

    Ok(TransactionHandle {
        tx_hash,
        sender,
        request,
        call,
        submitted_at: Instant::now(),
    })
}

fn rejected(err: NodeError) -> DepositError {
    DepositError::SubmissionRejected {
        reason: revert::describe_node_error(&err),
    }
}
