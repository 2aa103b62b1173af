//! Confirmation tracking
//!
//! Polls the node for the deposit's receipt until it is buried under the
//! required number of blocks, reverts, or the deadline passes.
//!
//! A reverted receipt is classified as soon as it is seen; a successful one
//! waits for `confirmations`. Node errors while polling are logged and polling
//! continues. Reaching the deadline does not cancel anything: the transaction
//! may still be mined afterwards.

use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, U256};
use evm_node_client::{ChainClient, ReceiptSummary};
use tokio::time::Instant;

use crate::calculator;
use crate::constants::ILRTDepositPool;
use crate::revert;
use crate::state::{
    ConfirmationPolicy, DepositError, DepositOutcome, DepositReceipt, TransactionHandle,
};

/// What one poll saw
enum PollResult {
    Pending,
    Included { block: u64, confirmations: u64 },
    Final(DepositOutcome),
}

/// Wait for a submitted deposit to be confirmed, and classify the result.
pub async fn await_confirmation<C: ChainClient + ?Sized>(
    client: &C,
    pool: Address,
    handle: &TransactionHandle,
    policy: &ConfirmationPolicy,
) -> DepositOutcome {
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let required = policy.confirmations.max(1);

    loop {
        match tokio::time::timeout_at(deadline, poll_once(client, pool, handle, required)).await {
            Ok(PollResult::Final(outcome)) => return outcome,
            Ok(PollResult::Included {
                block,
                confirmations,
            }) => {
                tracing::debug!(
                    tx_hash = %handle.tx_hash,
                    block,
                    confirmations,
                    required,
                    "Deposit included, waiting for confirmations"
                );
            }
            Ok(PollResult::Pending) => {
                tracing::debug!(tx_hash = %handle.tx_hash, "Deposit not yet mined");
            }
            Err(_) => {}
        }

        let now = Instant::now();
        if now >= deadline {
            let waited_secs = now.duration_since(started).as_secs();
            tracing::warn!(
                tx_hash = %handle.tx_hash,
                waited_secs,
                "Deposit not confirmed before deadline; it may still be included"
            );
            return Err(DepositError::ConfirmationTimeout {
                tx_hash: handle.tx_hash,
                waited_secs,
            });
        }

        let wake = (now + policy.poll_interval).min(deadline);
        tokio::time::sleep_until(wake).await;
    }
}

async fn poll_once<C: ChainClient + ?Sized>(
    client: &C,
    pool: Address,
    handle: &TransactionHandle,
    required: u64,
) -> PollResult {
    let receipt = match client.transaction_receipt(handle.tx_hash).await {
        Ok(Some(receipt)) => receipt,
        Ok(None) => return PollResult::Pending,
        Err(e) => {
            tracing::warn!(
                tx_hash = %handle.tx_hash,
                code = e.error_code(),
                "Receipt lookup failed: {}",
                e
            );
            return PollResult::Pending;
        }
    };

    // Pending-block receipts from some nodes have no block number yet
    let Some(block) = receipt.block_number else {
        return PollResult::Pending;
    };

    if !receipt.success {
        let reason = replay_revert_reason(client, handle, block).await;
        tracing::warn!(tx_hash = %handle.tx_hash, block, %reason, "Deposit reverted");
        return PollResult::Final(Err(DepositError::DepositReverted {
            tx_hash: handle.tx_hash,
            reason,
        }));
    }

    let head = match client.block_number().await {
        Ok(head) => head,
        Err(e) => {
            tracing::warn!(
                tx_hash = %handle.tx_hash,
                code = e.error_code(),
                "Head lookup failed: {}",
                e
            );
            return PollResult::Included {
                block,
                confirmations: 0,
            };
        }
    };

    let confirmations = calculator::confirmations(head, block);
    if confirmations < required {
        return PollResult::Included {
            block,
            confirmations,
        };
    }

    let minted_amount = minted_amount(&receipt, pool, handle.sender);
    tracing::info!(
        tx_hash = %handle.tx_hash,
        block,
        confirmations,
        minted = ?minted_amount,
        since_submit_secs = handle.submitted_at.elapsed().as_secs(),
        "Deposit confirmed"
    );

    PollResult::Final(Ok(DepositReceipt {
        tx_hash: handle.tx_hash,
        block_number: block,
        confirmations,
        gas_used: receipt.gas_used,
        asset: handle.request.asset(),
        deposit_amount: handle.request.amount(),
        min_amount_out: handle.request.min_amount_out(),
        referral_id: handle.request.referral_id(),
        minted_amount,
    }))
}

/// Re-run the deposit call to recover the revert payload.
///
/// The state after the inclusion block contains whatever ran before the
/// deposit in that block, so it is tried first; the state before the block
/// is the fallback.
async fn replay_revert_reason<C: ChainClient + ?Sized>(
    client: &C,
    handle: &TransactionHandle,
    block: u64,
) -> String {
    for at in [block, block.saturating_sub(1)] {
        match client.call(handle.call.clone(), Some(at)).await {
            Err(e) => return revert::describe_node_error(&e),
            Ok(_) => tracing::debug!(tx_hash = %handle.tx_hash, at, "Replay did not revert"),
        }
    }
    "unknown reason (replay did not revert)".to_string()
}

/// Receipt tokens minted to `depositor`, read from the pool's `AssetDeposit` log
pub fn minted_amount(receipt: &ReceiptSummary, pool: Address, depositor: Address) -> Option<U256> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == pool)
        .filter_map(|log| ILRTDepositPool::AssetDeposit::decode_log_data(&log.data).ok())
        .find(|event| event.depositor == depositor)
        .map(|event| event.novEthMintAmount)
}
