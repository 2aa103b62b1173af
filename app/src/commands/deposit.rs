use std::process::ExitCode;

use deposit_pool::{
    ConfirmationPolicy, DepositOrchestrator, DepositOutcome, DepositReceipt, DepositSettings,
    DepositStage,
};
use evm_node_client::{NodeClient, TxSigner, WalletSigner};
use lrt_core::{format_amount, parse_amount, TxHash};
use serde::Serialize;

use super::{load_config, print_json, targets};
use crate::cli::{Cli, DepositArgs};

/// What the `deposit` command prints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReport {
    pub status: DepositStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<DepositReceipt>,
    /// Minted amount in display units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
}

impl DepositReport {
    pub fn from_outcome(outcome: &DepositOutcome, decimals: u8) -> Self {
        match outcome {
            Ok(receipt) => Self {
                status: DepositStage::Confirmed,
                minted: receipt.minted_amount.map(|m| format_amount(m, decimals)),
                tx_hash: Some(receipt.tx_hash),
                receipt: Some(receipt.clone()),
                code: None,
                reason: None,
                recoverable: None,
            },
            Err(e) => Self {
                status: e.stage(),
                receipt: None,
                minted: None,
                code: Some(e.error_code()),
                reason: Some(e.to_string()),
                tx_hash: e.tx_hash(),
                recoverable: Some(e.is_recoverable()),
            },
        }
    }
}

/// Quote, submit and confirm one deposit
pub async fn run(cli: &Cli, args: &DepositArgs) -> anyhow::Result<ExitCode> {
    let mut config = load_config(cli)?;
    args.apply(&mut config);
    config.validate()?;

    let (pool, asset) = targets(&config)?;
    let decimals = config.deposit.decimals;
    let amount = parse_amount(&config.deposit.amount, decimals)?;
    let signer = WalletSigner::from_private_key(&args.private_key)?;

    let client = NodeClient::new(config.node.clone()).await?;
    let status = client.status().await;
    if !status.is_ready() {
        tracing::warn!(
            head = status.head,
            lag = ?status.sync_lag(),
            "Node is still syncing; quotes may be stale"
        );
    }

    tracing::info!(
        depositor = %signer.address(),
        %pool,
        %asset,
        amount = %config.deposit.amount,
        slippage_bps = config.deposit.slippage_bps,
        "Depositing"
    );

    let orchestrator = DepositOrchestrator::new(
        client,
        signer,
        pool,
        DepositSettings::from(&config.deposit),
        ConfirmationPolicy::from(&config.confirmation),
    );

    let outcome = orchestrator.deposit(asset, amount).await;
    print_json(&DepositReport::from_outcome(&outcome, decimals))?;

    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
