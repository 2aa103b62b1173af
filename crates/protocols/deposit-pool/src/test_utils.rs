//! Scripted chain for unit tests
//!
//! Records every call so tests can assert what did and did not reach the node.

use std::sync::Mutex;

use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolEvent};
use alloy_primitives::{keccak256, Address, Bytes, Log, TxHash, U256};
use async_trait::async_trait;
use evm_node_client::{ChainClient, FeeEstimate, ReceiptSummary, TxSigner, WalletSigner};
use lrt_core::NodeError;

use crate::constants::ILRTDepositPool;

/// anvil/hardhat account #0
const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Block the scripted receipts are included in; head starts here too
pub const INCLUSION_BLOCK: u64 = 100;

pub enum QuoteBehavior {
    Amount(U256),
    /// Quote call reverts with this payload
    Revert(Vec<u8>),
    Unreachable,
    /// Undecodable return data
    Raw(Vec<u8>),
}

pub enum ReceiptBehavior {
    Success {
        /// Receipt lookups answering "not mined" first
        after_polls: usize,
        minted: Option<U256>,
    },
    Reverted {
        after_polls: usize,
        /// Payload the replayed call reverts with
        data: Vec<u8>,
    },
    NeverMined,
}

#[derive(Default)]
struct MockState {
    calls: Vec<&'static str>,
    sent: Vec<TxHash>,
    receipt_polls: usize,
    unplaced_served: usize,
    head_calls: u64,
    replays: Vec<Option<u64>>,
}

pub struct MockChain {
    pub pool: Address,
    quote: QuoteBehavior,
    receipt: ReceiptBehavior,
    estimate_revert: Option<Vec<u8>>,
    broadcast_error: Option<String>,
    lost_broadcast: bool,
    receipt_errors: usize,
    unplaced_receipts: usize,
    replay_reverts_at: Option<u64>,
    head_errors: u64,
    head_lag: u64,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(quote: QuoteBehavior) -> Self {
        Self {
            pool: Address::repeat_byte(0x11),
            quote,
            receipt: ReceiptBehavior::Success {
                after_polls: 0,
                minted: None,
            },
            estimate_revert: None,
            broadcast_error: None,
            lost_broadcast: false,
            receipt_errors: 0,
            unplaced_receipts: 0,
            replay_reverts_at: None,
            head_errors: 0,
            head_lag: 0,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn asset() -> Address {
        Address::repeat_byte(0xaa)
    }

    pub fn signer() -> WalletSigner {
        WalletSigner::from_private_key(DEV_KEY).expect("dev key is valid")
    }

    pub fn with_receipt(mut self, receipt: ReceiptBehavior) -> Self {
        self.receipt = receipt;
        self
    }

    pub fn with_estimate_revert(mut self, data: Vec<u8>) -> Self {
        self.estimate_revert = Some(data);
        self
    }

    pub fn with_broadcast_error(mut self, message: &str) -> Self {
        self.broadcast_error = Some(message.to_string());
        self
    }

    /// The node keeps the transaction but the broadcast call times out
    pub fn with_lost_broadcast(mut self) -> Self {
        self.lost_broadcast = true;
        self
    }

    /// The replayed deposit only reverts against the state of `block`
    pub fn with_replay_reverting_at(mut self, block: u64) -> Self {
        self.replay_reverts_at = Some(block);
        self
    }

    /// The first `n` receipts found have no block number yet
    pub fn with_unplaced_receipts(mut self, n: usize) -> Self {
        self.unplaced_receipts = n;
        self
    }

    /// The first `n` head lookups fail
    pub fn with_head_errors(mut self, n: u64) -> Self {
        self.head_errors = n;
        self
    }

    /// Head starts `lag` blocks below the inclusion block
    pub fn with_head_lag(mut self, lag: u64) -> Self {
        self.head_lag = lag;
        self
    }

    /// Blocks the deposit was replayed at, in call order
    pub fn replays(&self) -> Vec<Option<u64>> {
        self.state.lock().unwrap().replays.clone()
    }

    /// The first `n` receipt lookups fail at the transport level
    pub fn with_receipt_errors(mut self, n: usize) -> Self {
        self.receipt_errors = n;
        self
    }

    pub fn count(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.iter().filter(|c| **c == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn sent_hashes(&self) -> Vec<TxHash> {
        self.state.lock().unwrap().sent.clone()
    }

    fn record(&self, name: &'static str) {
        self.state.lock().unwrap().calls.push(name);
    }

    fn deposit_log(&self, minted: U256) -> Log {
        let event = ILRTDepositPool::AssetDeposit {
            depositor: Self::signer().address(),
            asset: Self::asset(),
            depositAmount: U256::from(5_000u64),
            novEthMintAmount: minted,
            referralId: U256::ZERO,
        };
        Log {
            address: self.pool,
            data: event.encode_log_data(),
        }
    }

    fn reverted(data: &[u8]) -> NodeError {
        NodeError::ExecutionReverted {
            message: "execution reverted".to_string(),
            data: Some(data.to_vec()),
        }
    }
}

fn selector(tx: &TransactionRequest) -> Option<[u8; 4]> {
    let input = tx.input.input()?;
    input.get(..4)?.try_into().ok()
}

#[async_trait]
impl ChainClient for MockChain {
    async fn chain_id(&self) -> Result<u64, NodeError> {
        self.record("chain_id");
        Ok(31_337)
    }

    async fn block_number(&self) -> Result<u64, NodeError> {
        self.record("block_number");
        let mut state = self.state.lock().unwrap();
        let call = state.head_calls;
        state.head_calls += 1;
        if call < self.head_errors {
            return Err(NodeError::Timeout { secs: 30 });
        }
        Ok(INCLUSION_BLOCK - self.head_lag + (call - self.head_errors))
    }

    async fn call(
        &self,
        tx: TransactionRequest,
        at_block: Option<u64>,
    ) -> Result<Bytes, NodeError> {
        self.record("call");

        if selector(&tx) == Some(ILRTDepositPool::depositAssetCall::SELECTOR) {
            // Replay of a mined deposit
            self.state.lock().unwrap().replays.push(at_block);
            let reverts = match self.replay_reverts_at {
                Some(block) => at_block == Some(block),
                None => true,
            };
            return match &self.receipt {
                ReceiptBehavior::Reverted { data, .. } if reverts => Err(Self::reverted(data)),
                _ => Ok(Bytes::new()),
            };
        }

        match &self.quote {
            QuoteBehavior::Amount(amount) => Ok(Bytes::from(
                ILRTDepositPool::getNovETHAmountToMintCall::abi_encode_returns(amount),
            )),
            QuoteBehavior::Revert(data) => Err(Self::reverted(data)),
            QuoteBehavior::Unreachable => Err(NodeError::Unreachable {
                url: "http://127.0.0.1:8545".to_string(),
            }),
            QuoteBehavior::Raw(data) => Ok(Bytes::from(data.clone())),
        }
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> Result<u64, NodeError> {
        self.record("estimate_gas");
        match &self.estimate_revert {
            Some(data) => Err(Self::reverted(data)),
            None => Ok(150_000),
        }
    }

    async fn fee_estimate(&self) -> Result<FeeEstimate, NodeError> {
        self.record("fee_estimate");
        Ok(FeeEstimate {
            max_fee_per_gas: 30_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
        })
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, NodeError> {
        self.record("pending_nonce");
        Ok(self.state.lock().unwrap().sent.len() as u64)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, NodeError> {
        self.record("send_raw_transaction");
        if let Some(message) = &self.broadcast_error {
            return Err(NodeError::ApiError {
                message: message.clone(),
            });
        }
        let hash = keccak256(&raw);
        self.state.lock().unwrap().sent.push(hash);
        if self.lost_broadcast {
            return Err(NodeError::Timeout { secs: 30 });
        }
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>, NodeError> {
        self.record("transaction_receipt");
        let poll = {
            let mut state = self.state.lock().unwrap();
            if !state.sent.contains(&hash) {
                return Ok(None);
            }
            let poll = state.receipt_polls;
            state.receipt_polls += 1;
            poll
        };

        if poll < self.receipt_errors {
            return Err(NodeError::ApiError {
                message: "connection reset".to_string(),
            });
        }

        let receipt = |success: bool, logs: Vec<Log>| {
            let mut state = self.state.lock().unwrap();
            let placed = state.unplaced_served >= self.unplaced_receipts;
            if !placed {
                state.unplaced_served += 1;
            }
            ReceiptSummary {
                tx_hash: hash,
                block_number: placed.then_some(INCLUSION_BLOCK),
                success,
                gas_used: 120_000,
                logs,
            }
        };

        Ok(match &self.receipt {
            ReceiptBehavior::Success {
                after_polls,
                minted,
            } if poll >= *after_polls => Some(receipt(
                true,
                minted.map(|m| vec![self.deposit_log(m)]).unwrap_or_default(),
            )),
            ReceiptBehavior::Reverted { after_polls, .. } if poll >= *after_polls => {
                Some(receipt(false, Vec::new()))
            }
            _ => None,
        })
    }
}
