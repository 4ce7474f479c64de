//! Leasegate CLI
//!
//! Acquire, hold, and release locks on a Leasegate authority from scripts.
//! Logs go to stderr; stdout carries only what a script needs (the lease id).

mod commands;
mod signal;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

/// Leasegate CLI: take turns on shared resources.
#[derive(Parser, Debug)]
#[command(name = "leasegate", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait for a lock and print the new lease id.
    Acquire(commands::acquire::AcquireArgs),
    /// Keep renewing a lease until interrupted, then release it.
    Renew(commands::renew::RenewArgs),
    /// Release a lease.
    Release(commands::release::ReleaseArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cancel = signal::cancel_on_signal();

    match cli.command {
        Command::Acquire(args) => commands::acquire::run(&args, cancel).await,
        Command::Renew(args) => commands::renew::run(&args, cancel).await,
        Command::Release(args) => commands::release::run(&args).await,
    }
}
