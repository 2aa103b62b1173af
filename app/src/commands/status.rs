use std::process::ExitCode;

use evm_node_client::NodeClient;

use super::{load_config, print_json};
use crate::cli::Cli;

/// Probe the configured node and print what it reports
pub async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli)?;
    let client = NodeClient::new_without_probe(config.node.clone())?;

    let status = client.status().await;
    tracing::debug!(
        url = %config.node.url,
        online = status.is_online,
        network = %status.network.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
        sync = status.sync.as_str(),
        "Node probed"
    );
    print_json(&status)?;

    Ok(if status.is_online {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
