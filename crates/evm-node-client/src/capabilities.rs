//! Node status detection
//!
//! Probes chain id, head block and `eth_syncing` so callers can refuse to
//! deposit through a node that is offline or far behind.

use std::time::Duration;

use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::SyncStatus;
use lrt_core::Network;
use serde::{Deserialize, Serialize};

/// Maximum lag (in blocks) before considering the node as "syncing"
const MAX_SYNC_LAG: u64 = 10;

/// Sync state reported by `eth_syncing`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Synced,
    Syncing { current: u64, highest: u64 },
    /// The node did not answer `eth_syncing`
    Unknown,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Syncing { .. } => "syncing",
            Self::Unknown => "unknown",
        }
    }
}

/// Node status detected through probing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Node is reachable and responding
    pub is_online: bool,

    pub chain_id: Option<u64>,

    pub network: Option<Network>,

    /// Latest block number
    pub head: u64,

    pub sync: SyncState,
}

impl NodeStatus {
    fn offline() -> Self {
        Self {
            is_online: false,
            chain_id: None,
            network: None,
            head: 0,
            sync: SyncState::Unknown,
        }
    }

    /// Blocks between the node's current block and the best known block
    pub fn sync_lag(&self) -> Option<u64> {
        match self.sync {
            SyncState::Synced => Some(0),
            SyncState::Syncing { current, highest } => Some(highest.saturating_sub(current)),
            SyncState::Unknown => None,
        }
    }

    /// Online and within [`MAX_SYNC_LAG`] of the tip (unknown sync state counts as ready)
    pub fn is_ready(&self) -> bool {
        self.is_online && self.sync_lag().map_or(true, |lag| lag <= MAX_SYNC_LAG)
    }
}

/// Detect node status by probing endpoints
pub async fn detect_status(provider: &DynProvider, timeout: Duration) -> NodeStatus {
    let head = match tokio::time::timeout(timeout, provider.get_block_number()).await {
        Ok(Ok(h)) => h,
        _ => return NodeStatus::offline(),
    };

    let chain_id = tokio::time::timeout(timeout, provider.get_chain_id())
        .await
        .ok()
        .and_then(|r| r.ok());

    let sync = match tokio::time::timeout(timeout, provider.syncing()).await {
        Ok(Ok(SyncStatus::None)) => SyncState::Synced,
        Ok(Ok(SyncStatus::Info(info))) => SyncState::Syncing {
            current: info.current_block.saturating_to(),
            highest: info.highest_block.saturating_to(),
        },
        _ => SyncState::Unknown,
    };

    NodeStatus {
        is_online: true,
        chain_id,
        network: chain_id.map(Network::from_chain_id),
        head,
        sync,
    }
}
