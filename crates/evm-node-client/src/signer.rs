//! Transaction signing
//!
//! The signer only turns a fully filled request into a signed envelope; it
//! never talks to the node.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use lrt_core::TxError;

/// Account that signs deposits
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// Sender address for requests signed by this signer
    fn address(&self) -> Address;

    /// Sign a request that already has nonce, gas and fee fields set.
    /// Returns the EIP-2718 encoded transaction.
    async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes, TxError>;
}

/// Local private-key signer
#[derive(Clone)]
pub struct WalletSigner {
    wallet: EthereumWallet,
    address: Address,
}

impl WalletSigner {
    /// Build from a hex-encoded secp256k1 key (with or without `0x`)
    pub fn from_private_key(key: &str) -> Result<Self, TxError> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let bytes = hex::decode(key).map_err(|e| TxError::SigningFailed {
            message: format!("decode private key: {}", e),
        })?;

        let signer = PrivateKeySigner::from_slice(&bytes).map_err(|e| TxError::SigningFailed {
            message: format!("invalid private key: {}", e),
        })?;

        Ok(Self::from_signer(signer))
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self {
            wallet: EthereumWallet::from(signer),
            address,
        }
    }
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TxSigner for WalletSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(&self, tx: TransactionRequest) -> Result<Bytes, TxError> {
        let tx = tx.with_from(self.address);
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &self.wallet)
            .await
            .map_err(|e| TxError::SigningFailed {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(envelope.encoded_2718()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    // Well-known development key (anvil/hardhat account #0)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_from_private_key_derives_address() {
        let signer = WalletSigner::from_private_key(DEV_KEY).unwrap();
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(signer.address(), expected);

        let unprefixed = WalletSigner::from_private_key(&DEV_KEY[2..]).unwrap();
        assert_eq!(unprefixed.address(), expected);
    }

    #[test]
    fn test_from_private_key_rejects_bad_input() {
        assert!(WalletSigner::from_private_key("zz").is_err());
        assert!(WalletSigner::from_private_key("0x1234").is_err());
    }

    #[tokio::test]
    async fn test_sign_filled_request() {
        let signer = WalletSigner::from_private_key(DEV_KEY).unwrap();
        let tx = TransactionRequest::default()
            .with_to(Address::repeat_byte(0x11))
            .with_value(U256::ZERO)
            .with_nonce(0)
            .with_chain_id(31_337)
            .with_gas_limit(100_000)
            .with_max_fee_per_gas(2_000_000_000)
            .with_max_priority_fee_per_gas(1_000_000_000);

        let raw = signer.sign_transaction(tx).await.unwrap();
        // EIP-1559 envelopes start with the type byte 0x02
        assert_eq!(raw[0], 0x02);
    }

    #[tokio::test]
    async fn test_sign_incomplete_request_fails() {
        let signer = WalletSigner::from_private_key(DEV_KEY).unwrap();
        let tx = TransactionRequest::default().with_to(Address::repeat_byte(0x11));
        assert!(matches!(
            signer.sign_transaction(tx).await,
            Err(TxError::SigningFailed { .. })
        ));
    }
}
