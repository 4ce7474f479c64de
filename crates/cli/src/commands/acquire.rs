use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use leasegate_locker::{AcquireOptions, CancellationToken, LockerError, ProgressWait};

use super::{Target, millis};

#[derive(Args, Debug)]
pub struct AcquireArgs {
    #[command(flatten)]
    pub target: Target,
    /// Lease lifetime in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub ttl_ms: u64,
    /// Delay between attempts while the lock is held, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    pub poll_ms: u64,
    /// Give up after this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Recorded on the lock for diagnostics.
    #[arg(long, env = "LEASEGATE_ACQUIRER_ID")]
    pub acquirer_id: Option<String>,
}

impl AcquireArgs {
    pub fn ttl(&self) -> Duration {
        millis(self.ttl_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        millis(self.poll_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(millis)
    }
}

pub async fn run(args: &AcquireArgs, cancel: CancellationToken) -> anyhow::Result<ExitCode> {
    let locker = args.target.locker()?;

    let mut opts = AcquireOptions::new()
        .ttl(args.ttl())
        .poll_interval(args.poll_interval())
        .wait_handler(ProgressWait::default())
        .cancel_token(cancel);
    if let Some(id) = &args.acquirer_id {
        opts = opts.acquirer_id(id.as_str());
    }
    if let Some(timeout) = args.timeout() {
        opts = opts.timeout(timeout);
    }

    match locker.acquire(args.target.name.as_str(), opts).await {
        Ok(handle) => {
            println!("{}", handle.lease_id);
            Ok(ExitCode::SUCCESS)
        }
        Err(LockerError::Cancelled) => {
            eprintln!("Cancelled while waiting for lock {}.", args.target.name);
            Ok(ExitCode::from(130))
        }
        Err(e) => {
            eprintln!("Failed to acquire lock {}: {e}", args.target.name);
            Ok(ExitCode::FAILURE)
        }
    }
}
