//! Deposit Pool Constants
//!
//! Contract interface and flow defaults.

use std::time::Duration;

alloy::sol! {
    /// Public surface of the LRT deposit pool used by the depositor
    interface ILRTDepositPool {
        /// Receipt tokens minted for `amount` of `asset` at current state
        function getNovETHAmountToMint(address asset, uint256 amount)
            external
            view
            returns (uint256 novETHAmount);

        function depositAsset(
            address asset,
            uint256 depositAmount,
            uint256 minNovETHAmountExpected,
            uint256 referralId
        ) external;

        event AssetDeposit(
            address indexed depositor,
            address indexed asset,
            uint256 depositAmount,
            uint256 novEthMintAmount,
            uint256 referralId
        );

        error TokenNotSupported();
        error InvalidAmountToDeposit();
        error MaximumDepositLimitReached();
        error MinimumAmountToReceiveNotMet();
        error EnforcedPause();
    }
}

/// Extra gas on top of the node's estimate (percent)
pub const GAS_LIMIT_BUFFER_PCT: u64 = 20;

/// Default quote staleness window
pub const DEFAULT_MAX_QUOTE_AGE: Duration = Duration::from_secs(60);

/// Default confirmation policy
pub const DEFAULT_CONFIRMATIONS: u64 = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Referral id meaning "no referral"
pub const NO_REFERRAL: u64 = 0;
