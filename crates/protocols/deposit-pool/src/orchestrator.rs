//! Deposit orchestration
//!
//! Runs one deposit through INIT -> QUOTED -> SUBMITTED -> terminal, strictly
//! in sequence. The node client and the signer are injected; nothing is kept
//! between calls, so two calls with identical inputs are two independent
//! transactions.
//!
//! Quote and submission are not atomic: the pool's rate can move between the
//! read and inclusion. The minimum-output floor and the quote staleness window
//! bound that race; they do not remove it.

use alloy_primitives::{Address, U256};
use evm_node_client::{ChainClient, TxSigner};

use crate::calculator;
use crate::confirmation::await_confirmation;
use crate::fetch::fetch_quote;
use crate::state::{
    check_inputs, check_slippage, ConfirmationPolicy, DepositError, DepositOutcome,
    DepositRequest, DepositSettings, DepositStage, Quote,
};
use crate::tx_builder::submit_deposit;

/// Deposits into one pool on behalf of one signer
pub struct DepositOrchestrator<C, S> {
    client: C,
    signer: S,
    pool: Address,
    settings: DepositSettings,
    policy: ConfirmationPolicy,
}

impl<C, S> DepositOrchestrator<C, S>
where
    C: ChainClient,
    S: TxSigner,
{
    pub fn new(
        client: C,
        signer: S,
        pool: Address,
        settings: DepositSettings,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            client,
            signer,
            pool,
            settings,
            policy,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Current mint quote for `amount` of `asset`
    pub async fn quote(&self, asset: Address, amount: U256) -> Result<Quote, DepositError> {
        fetch_quote(&self.client, self.pool, asset, amount).await
    }

    /// Quote, submit and wait for the deposit to be confirmed.
    ///
    /// Success is only returned once the confirmation tracker has seen the
    /// required depth.
    pub async fn deposit(&self, asset: Address, amount: U256) -> DepositOutcome {
        let outcome = self.run(asset, amount).await;

        match &outcome {
            Ok(receipt) => tracing::info!(
                stage = %DepositStage::Confirmed,
                tx_hash = %receipt.tx_hash,
                block = receipt.block_number,
                "Deposit finished"
            ),
            Err(e) => tracing::error!(
                stage = %e.stage(),
                code = e.error_code(),
                "Deposit failed: {}",
                e
            ),
        }

        outcome
    }

    async fn run(&self, asset: Address, amount: U256) -> DepositOutcome {
        tracing::debug!(
            stage = %DepositStage::Init,
            %asset,
            %amount,
            pool = %self.pool,
            "Starting deposit"
        );
        check_inputs(asset, amount)?;
        check_slippage(self.settings.slippage_bps)?;

        let quote = self.quote(asset, amount).await?;
        tracing::info!(
            stage = %DepositStage::Quoted,
            mint_amount = %quote.mint_amount,
            "Quote resolved"
        );

        let request = DepositRequest::from_quote(
            &quote,
            self.settings.slippage_bps,
            self.settings.referral_id,
            self.settings.max_quote_age,
        )?;

        let handle = submit_deposit(&self.client, &self.signer, self.pool, request).await?;
        tracing::info!(
            stage = %DepositStage::Submitted,
            tx_hash = %handle.tx_hash,
            "Waiting for confirmation"
        );

        let receipt = await_confirmation(&self.client, self.pool, &handle, &self.policy).await?;

        if let Some(minted) = receipt.minted_amount {
            let slippage = calculator::realized_slippage_bps(quote.mint_amount, minted);
            tracing::info!(%minted, quoted = %quote.mint_amount, slippage_bps = slippage, "Minted");
        }

        Ok(receipt)
    }
}
