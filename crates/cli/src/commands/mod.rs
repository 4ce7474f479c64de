pub mod acquire;
pub mod release;
pub mod renew;

use std::time::Duration;

use clap::Args;
use leasegate_client::LeasegateClient;
use leasegate_core::{LockHandle, ReleaseOutcome};
use leasegate_locker::{DistributedLocker, LockerError};

/// Which lock on which authority.
#[derive(Args, Debug)]
pub struct Target {
    /// Lock name.
    #[arg(short, long, default_value = "deploy")]
    pub name: String,
    /// Authority URL. Only the scheme and host are used.
    #[arg(env = "LEASEGATE_SERVER")]
    pub server: String,
}

impl Target {
    pub fn locker(&self) -> anyhow::Result<DistributedLocker<LeasegateClient>> {
        Ok(DistributedLocker::new(LeasegateClient::new(&self.server)?))
    }
}

pub(crate) fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Print why a release did not happen; `true` only if the lease was released.
pub(crate) fn report_release(
    handle: &LockHandle,
    result: &Result<ReleaseOutcome, LockerError>,
) -> bool {
    match result {
        Ok(ReleaseOutcome::Released) => true,
        Ok(ReleaseOutcome::NotOwner) => {
            eprintln!("Lease {} does not hold lock {}.", handle.lease_id, handle.name);
            false
        }
        Err(e) => {
            eprintln!("Failed to release lock {}: {e}", handle.name);
            false
        }
    }
}
