use std::process::ExitCode;

use clap::Args;
use leasegate_core::LockHandle;

use super::{Target, report_release};

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub target: Target,
    /// Lease id printed by `acquire`.
    #[arg(short, long)]
    pub lease: String,
}

pub async fn run(args: &ReleaseArgs) -> anyhow::Result<ExitCode> {
    let locker = args.target.locker()?;
    let handle = LockHandle::new(args.target.name.as_str(), args.lease.as_str());

    let result = locker.release(&handle).await;
    Ok(if report_release(&handle, &result) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
