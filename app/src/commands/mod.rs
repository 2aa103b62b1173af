pub mod deposit;
pub mod quote;
pub mod status;

use anyhow::Context;
use lrt_core::{Address, AppConfig, ConfigError};
use serde::Serialize;

use crate::cli::Cli;

/// File config (if any) with global CLI overrides applied
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    Ok(config)
}

/// Pool and asset of a validated config
pub fn targets(config: &AppConfig) -> Result<(Address, Address), ConfigError> {
    let pool = config
        .deposit
        .pool_address
        .ok_or(ConfigError::Missing { field: "deposit.pool_address" })?;
    let asset = config
        .deposit
        .asset_address
        .ok_or(ConfigError::Missing { field: "deposit.asset_address" })?;
    Ok((pool, asset))
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
