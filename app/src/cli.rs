//! Command-line arguments
//!
//! Every setting can come from a flag, an environment variable, or the TOML
//! config file, in that order of precedence.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lrt_core::{Address, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "lrt-depositor", version, about = "Deposit assets into an LRT deposit pool")]
pub struct Cli {
    /// Optional TOML config file
    #[arg(long, short, env = "LRT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Quote, submit and wait for a deposit
    Deposit(DepositArgs),

    /// Show the current quote and the floor a deposit would use; submits nothing
    Quote(PoolArgs),

    /// Probe the node
    Status,
}

#[derive(Debug, Args)]
pub struct PoolArgs {
    /// Deposit pool contract
    #[arg(long, env = "LRT_DEPOSIT_POOL")]
    pub pool: Option<Address>,

    /// Asset to deposit
    #[arg(long, env = "ASSET_ADDRESS")]
    pub asset: Option<Address>,

    /// Human-readable amount, e.g. 0.005
    #[arg(long, env = "DEPOSIT_AMOUNT")]
    pub amount: Option<String>,

    /// Asset decimals
    #[arg(long, env = "ASSET_DECIMALS")]
    pub decimals: Option<u8>,

    /// Accepted shortfall below the quote, in basis points
    #[arg(long, env = "SLIPPAGE_BPS")]
    pub slippage_bps: Option<u16>,

    #[arg(long, env = "REFERRAL_ID")]
    pub referral_id: Option<u64>,
}

#[derive(Debug, Args)]
pub struct DepositArgs {
    #[command(flatten)]
    pub pool: PoolArgs,

    /// Hex private key of the depositing account
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    #[arg(long, env = "CONFIRMATIONS")]
    pub confirmations: Option<u64>,

    #[arg(long, env = "CONFIRMATION_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    #[arg(long, env = "POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,
}

impl Cli {
    /// Apply global overrides on top of the file config
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.rpc_url {
            config.node.url = url.clone();
        }
    }
}

impl PoolArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        let deposit = &mut config.deposit;
        if let Some(pool) = self.pool {
            deposit.pool_address = Some(pool);
        }
        if let Some(asset) = self.asset {
            deposit.asset_address = Some(asset);
        }
        if let Some(amount) = &self.amount {
            deposit.amount = amount.clone();
        }
        if let Some(decimals) = self.decimals {
            deposit.decimals = decimals;
        }
        if let Some(bps) = self.slippage_bps {
            deposit.slippage_bps = bps;
        }
        if let Some(referral_id) = self.referral_id {
            deposit.referral_id = referral_id;
        }
    }
}

impl DepositArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        self.pool.apply(config);
        let confirmation = &mut config.confirmation;
        if let Some(n) = self.confirmations {
            confirmation.confirmations = n;
        }
        if let Some(secs) = self.timeout_secs {
            confirmation.timeout_secs = secs;
        }
        if let Some(secs) = self.poll_interval_secs {
            confirmation.poll_interval_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const POOL: &str = "0x1111111111111111111111111111111111111111";
    const ASSET: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deposit_args_override_config() {
        let cli = Cli::try_parse_from([
            "lrt-depositor",
            "--rpc-url",
            "http://localhost:9545",
            "deposit",
            "--pool",
            POOL,
            "--asset",
            ASSET,
            "--amount",
            "0.25",
            "--slippage-bps",
            "30",
            "--private-key",
            "0x01",
            "--confirmations",
            "2",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        let Command::Deposit(args) = &cli.command else {
            panic!("expected deposit command");
        };
        args.apply(&mut config);

        assert_eq!(config.node.url, "http://localhost:9545");
        assert_eq!(config.deposit.pool_address, Some(POOL.parse().unwrap()));
        assert_eq!(config.deposit.asset_address, Some(ASSET.parse().unwrap()));
        assert_eq!(config.deposit.amount, "0.25");
        assert_eq!(config.deposit.slippage_bps, 30);
        assert_eq!(config.confirmation.confirmations, 2);
        // untouched values keep their defaults
        assert_eq!(config.deposit.decimals, 18);
        assert_eq!(config.confirmation.timeout_secs, 120);
    }

    #[test]
    fn test_quote_does_not_need_key() {
        let cli = Cli::try_parse_from(["lrt-depositor", "quote", "--pool", POOL]).unwrap();
        assert!(matches!(cli.command, Command::Quote(_)));
    }

    #[test]
    fn test_rejects_malformed_address() {
        let result = Cli::try_parse_from(["lrt-depositor", "quote", "--pool", "0x1234"]);
        assert!(result.is_err());
    }
}
