//! LRT depositor command-line application

pub mod cli;
pub mod commands;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};

/// Parse arguments, set up logging and run the selected command
pub async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON result only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lrt_depositor=debug".parse()?)
                .add_directive("deposit_pool=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting lrt-depositor");

    match &cli.command {
        Command::Deposit(args) => commands::deposit::run(&cli, args).await,
        Command::Quote(args) => commands::quote::run(&cli, args).await,
        Command::Status => commands::status::run(&cli).await,
    }
}
