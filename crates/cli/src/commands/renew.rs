use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use leasegate_core::LockHandle;
use leasegate_locker::{CancellationToken, HoldOptions, HoldOutcome};
use tracing::info;

use super::{Target, millis, report_release};

#[derive(Args, Debug)]
pub struct RenewArgs {
    #[command(flatten)]
    pub target: Target,
    /// Lease id printed by `acquire`.
    #[arg(short, long)]
    pub lease: String,
    /// Lifetime requested on each renewal, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub ttl_ms: u64,
}

impl RenewArgs {
    pub fn ttl(&self) -> Duration {
        millis(self.ttl_ms)
    }
}

pub async fn run(args: &RenewArgs, cancel: CancellationToken) -> anyhow::Result<ExitCode> {
    let locker = args.target.locker()?;
    let handle = LockHandle::new(args.target.name.as_str(), args.lease.as_str());

    let mut keeper =
        locker.hold_lease(handle.clone(), HoldOptions::new(args.ttl()).cancel_token(cancel))?;

    match keeper.finished().await {
        HoldOutcome::Stopped => {
            info!(lock = %handle.name, "releasing lease");
            let result = locker.release(&handle).await;
            Ok(if report_release(&handle, &result) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        outcome @ (HoldOutcome::Lost | HoldOutcome::Expired) => {
            eprintln!("Stopped holding lock {}: lease {outcome:?}.", handle.name);
            Ok(ExitCode::FAILURE)
        }
    }
}
