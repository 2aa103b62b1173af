//! evm-node-client: JSON-RPC node access and signing capabilities
//!
//! The deposit flow only talks to the chain through [`ChainClient`] and only
//! signs through [`TxSigner`], so both can be swapped for scripted doubles in
//! tests. [`NodeClient`] is the alloy-backed HTTP implementation.

pub mod capabilities;
pub mod signer;

use std::time::Duration;

use alloy::eips::BlockId;
use alloy::primitives::{Address, Bytes, Log, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::http::reqwest::Url;
use alloy::transports::TransportError;
use async_trait::async_trait;
use lrt_core::{BlockNumber, NodeConfig, NodeError};

pub use capabilities::{NodeStatus, SyncState};
pub use signer::{TxSigner, WalletSigner};

/// Result type for node client operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// EIP-1559 fee caps, in wei per gas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// The parts of a transaction receipt the deposit flow reads
#[derive(Debug, Clone)]
pub struct ReceiptSummary {
    pub tx_hash: TxHash,
    pub block_number: Option<BlockNumber>,
    /// `false` when execution reverted
    pub success: bool,
    pub gas_used: u64,
    pub logs: Vec<Log>,
}

impl From<TransactionReceipt> for ReceiptSummary {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
            gas_used: receipt.gas_used,
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        }
    }
}

/// Chain access needed to quote, submit and track a transaction
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    /// Latest block number
    async fn block_number(&self) -> Result<BlockNumber>;

    /// `eth_call` against the latest block, or `at_block` when given
    async fn call(
        &self,
        tx: TransactionRequest,
        at_block: Option<BlockNumber>,
    ) -> Result<Bytes>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64>;

    async fn fee_estimate(&self) -> Result<FeeEstimate>;

    /// Next nonce for `address`, counting pending transactions
    async fn pending_nonce(&self, address: Address) -> Result<u64>;

    /// Broadcast a signed EIP-2718 envelope. Returns once the node accepted it.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash>;

    /// `None` while the transaction is not yet mined (or unknown to the node)
    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>>;
}

/// HTTP JSON-RPC client
#[derive(Clone)]
pub struct NodeClient {
    inner: DynProvider,
    config: NodeConfig,
}

impl NodeClient {
    /// Create a new client and check that the node answers
    pub async fn new(config: NodeConfig) -> Result<Self> {
        let client = Self::new_without_probe(config)?;

        let chain_id = client.chain_id().await.map_err(|e| NodeError::Unreachable {
            url: format!("{}: {}", client.config.url, e),
        })?;
        tracing::info!(chain_id, url = %client.config.url, "Connected to node");

        Ok(client)
    }

    /// Create without probing (for testing or when node may be offline)
    pub fn new_without_probe(config: NodeConfig) -> Result<Self> {
        let url: Url = config.url.parse().map_err(|e| NodeError::Unreachable {
            url: format!("{}: {}", config.url, e),
        })?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            inner: provider,
            config,
        })
    }

    /// Get the current node configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Probe chain id, head and sync state
    pub async fn status(&self) -> NodeStatus {
        capabilities::detect_status(&self.inner, self.request_timeout()).await
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    async fn timed<T>(
        &self,
        fut: impl std::future::Future<Output = std::result::Result<T, TransportError>>,
    ) -> Result<T> {
        timed_request(self.request_timeout(), fut).await
    }
}

#[async_trait]
impl ChainClient for NodeClient {
    async fn chain_id(&self) -> Result<u64> {
        self.timed(async { self.inner.get_chain_id().await }).await
    }

    async fn block_number(&self) -> Result<BlockNumber> {
        self.timed(async { self.inner.get_block_number().await })
            .await
    }

    async fn call(&self, tx: TransactionRequest, at_block: Option<BlockNumber>) -> Result<Bytes> {
        let block = at_block.map(BlockId::number).unwrap_or_else(BlockId::latest);
        self.timed(async { self.inner.call(tx).block(block).await })
            .await
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        self.timed(async { self.inner.estimate_gas(tx).await }).await
    }

    async fn fee_estimate(&self) -> Result<FeeEstimate> {
        let estimate = self
            .timed(async { self.inner.estimate_eip1559_fees().await })
            .await?;
        Ok(FeeEstimate {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64> {
        self.timed(async { self.inner.get_transaction_count(address).pending().await })
            .await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash> {
        let pending = self
            .timed(async { self.inner.send_raw_transaction(&raw).await })
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<ReceiptSummary>> {
        let receipt = self
            .timed(async { self.inner.get_transaction_receipt(hash).await })
            .await?;
        Ok(receipt.map(ReceiptSummary::from))
    }
}

/// Run a node request with a deadline and map the RPC error into [`NodeError`].
async fn timed_request<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = std::result::Result<T, TransportError>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| NodeError::Timeout {
            secs: timeout.as_secs(),
        })?
        .map_err(map_rpc_error)
}

/// Split EVM reverts (which carry an answer from the chain) from transport failures.
fn map_rpc_error(err: TransportError) -> NodeError {
    if let Some(payload) = err.as_error_resp() {
        let revert_data = payload.as_revert_data();
        let message = payload.message.to_string();
        if revert_data.is_some() || message.to_lowercase().contains("revert") {
            return NodeError::ExecutionReverted {
                message,
                data: revert_data.map(|data| data.to_vec()),
            };
        }
        return NodeError::ApiError { message };
    }

    if err.is_transport_error() {
        return NodeError::Unreachable {
            url: err.to_string(),
        };
    }

    NodeError::ParseError(err.to_string())
}
