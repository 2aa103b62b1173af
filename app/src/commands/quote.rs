use std::process::ExitCode;

use deposit_pool::{preview_deposit, DepositSettings};
use evm_node_client::NodeClient;
use lrt_core::parse_amount;

use super::{load_config, print_json, targets};
use crate::cli::{Cli, PoolArgs};

/// Print the current quote and the floor a deposit would be sent with
pub async fn run(cli: &Cli, args: &PoolArgs) -> anyhow::Result<ExitCode> {
    let mut config = load_config(cli)?;
    args.apply(&mut config);
    config.validate()?;

    let (pool, asset) = targets(&config)?;
    let amount = parse_amount(&config.deposit.amount, config.deposit.decimals)?;
    let settings = DepositSettings::from(&config.deposit);

    let client = NodeClient::new(config.node.clone()).await?;
    match preview_deposit(&client, pool, asset, amount, &settings).await {
        Ok(preview) => {
            print_json(&preview)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(code = e.error_code(), "Quote failed: {}", e);
            print_json(&serde_json::json!({
                "status": e.stage(),
                "code": e.error_code(),
                "reason": e.to_string(),
            }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}
