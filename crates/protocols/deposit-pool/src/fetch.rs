//! Quote Resolution
//!
//! Reads the pool's current mint quote through `eth_call`, and previews the
//! floor a deposit would be sent with. Nothing here signs or submits.

use alloy::network::TransactionBuilder;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy_primitives::{Address, U256};
use evm_node_client::ChainClient;
use tokio::time::Instant;

use crate::calculator;
use crate::constants::ILRTDepositPool;
use crate::revert;
use crate::state::{
    check_inputs, check_slippage, DepositError, DepositPreview, DepositSettings, Quote,
};

/// Build the read-only `getNovETHAmountToMint` call
pub fn build_quote_call(pool: Address, asset: Address, amount: U256) -> TransactionRequest {
    let call = ILRTDepositPool::getNovETHAmountToMintCall { asset, amount };
    TransactionRequest::default()
        .with_to(pool)
        .with_input(call.abi_encode())
}

/// Ask the pool how many receipt tokens `amount` of `asset` mints right now.
///
/// Unsupported assets and paused pools revert the call; that, a network
/// failure, or an undecodable answer all surface as `QuoteUnavailable`.
pub async fn fetch_quote<C: ChainClient + ?Sized>(
    client: &C,
    pool: Address,
    asset: Address,
    amount: U256,
) -> Result<Quote, DepositError> {
    check_inputs(asset, amount)?;

    let data = client
        .call(build_quote_call(pool, asset, amount), None)
        .await
        .map_err(|e| DepositError::QuoteUnavailable {
            reason: revert::describe_node_error(&e),
        })?;

    let mint_amount = ILRTDepositPool::getNovETHAmountToMintCall::abi_decode_returns(&data)
        .map_err(|e| DepositError::QuoteUnavailable {
            reason: format!("malformed quote response: {}", e),
        })?;

    tracing::debug!(
        %pool,
        %asset,
        %amount,
        %mint_amount,
        "Fetched mint quote"
    );

    Ok(Quote {
        asset,
        deposit_amount: amount,
        mint_amount,
        fetched_at: Instant::now(),
    })
}

/// Current quote plus the minimum output a deposit would use with `settings`
pub async fn preview_deposit<C: ChainClient + ?Sized>(
    client: &C,
    pool: Address,
    asset: Address,
    amount: U256,
    settings: &DepositSettings,
) -> Result<DepositPreview, DepositError> {
    check_slippage(settings.slippage_bps)?;
    let quote = fetch_quote(client, pool, asset, amount).await?;

    Ok(DepositPreview {
        asset,
        deposit_amount: amount,
        quoted_mint_amount: quote.mint_amount,
        min_amount_out: calculator::minimum_output(quote.mint_amount, settings.slippage_bps),
        slippage_bps: settings.slippage_bps,
        referral_id: settings.referral_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockChain, QuoteBehavior};
    use alloy::sol_types::SolError;

    #[test]
    fn test_build_quote_call_encodes_selector() {
        let tx = build_quote_call(
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(5u64),
        );
        let input = tx.input.input().unwrap();
        assert_eq!(
            &input[..4],
            &ILRTDepositPool::getNovETHAmountToMintCall::SELECTOR[..]
        );
        assert_eq!(tx.to, Some(Address::repeat_byte(0x11).into()));
    }

    #[tokio::test]
    async fn test_fetch_quote_returns_pool_answer() {
        let chain = MockChain::new(QuoteBehavior::Amount(U256::from(4_900u64)));
        let quote = fetch_quote(&chain, chain.pool, MockChain::asset(), U256::from(5_000u64))
            .await
            .unwrap();
        assert_eq!(quote.mint_amount, U256::from(4_900u64));
        assert_eq!(quote.deposit_amount, U256::from(5_000u64));
        assert_eq!(chain.count("call"), 1);
    }

    #[tokio::test]
    async fn test_fetch_quote_unsupported_asset() {
        let chain = MockChain::new(QuoteBehavior::Revert(
            ILRTDepositPool::TokenNotSupported {}.abi_encode(),
        ));
        let err = fetch_quote(&chain, chain.pool, MockChain::asset(), U256::from(5_000u64))
            .await
            .unwrap_err();
        match err {
            DepositError::QuoteUnavailable { reason } => assert_eq!(reason, "TokenNotSupported"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_quote_network_failure() {
        let chain = MockChain::new(QuoteBehavior::Unreachable);
        let err = fetch_quote(&chain, chain.pool, MockChain::asset(), U256::from(5_000u64))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "quote_unavailable");
    }

    #[tokio::test]
    async fn test_fetch_quote_malformed_response() {
        let chain = MockChain::new(QuoteBehavior::Raw(vec![0x01, 0x02]));
        let err = fetch_quote(&chain, chain.pool, MockChain::asset(), U256::from(5_000u64))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[tokio::test]
    async fn test_fetch_quote_zero_amount_never_calls_node() {
        let chain = MockChain::new(QuoteBehavior::Amount(U256::from(1u64)));
        let err = fetch_quote(&chain, chain.pool, MockChain::asset(), U256::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, DepositError::InvalidRequest(_)));
        assert_eq!(chain.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_preview_applies_slippage() {
        let chain = MockChain::new(QuoteBehavior::Amount(U256::from(10_000u64)));
        let settings = DepositSettings {
            slippage_bps: 50,
            ..DepositSettings::default()
        };

        let preview = preview_deposit(
            &chain,
            chain.pool,
            MockChain::asset(),
            U256::from(10_000u64),
            &settings,
        )
        .await
        .unwrap();

        assert_eq!(preview.quoted_mint_amount, U256::from(10_000u64));
        assert_eq!(preview.min_amount_out, U256::from(9_950u64));
        assert_eq!(chain.count("send_raw_transaction"), 0);
    }

    #[tokio::test]
    async fn test_preview_rejects_excessive_slippage() {
        let chain = MockChain::new(QuoteBehavior::Amount(U256::from(10_000u64)));
        let settings = DepositSettings {
            slippage_bps: 10_001,
            ..DepositSettings::default()
        };

        let err = preview_deposit(
            &chain,
            chain.pool,
            MockChain::asset(),
            U256::from(10_000u64),
            &settings,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DepositError::InvalidRequest(_)));
        assert_eq!(chain.total_calls(), 0);
    }
}
