//! Client-side locking on top of a [`LockBackend`].
//!
//! [`DistributedLocker`] turns the backend's single-shot operations into
//! what callers actually want: wait until a lock is free
//! ([`DistributedLocker::acquire`]), keep a lease alive in the background
//! while work runs ([`DistributedLocker::hold_lease`]), and let go
//! ([`DistributedLocker::release`]).
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use leasegate_client::LeasegateClient;
//! use leasegate_locker::{AcquireOptions, DistributedLocker, HoldOptions, ProgressWait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let locker = DistributedLocker::new(LeasegateClient::new("http://localhost:3000")?);
//!
//! let handle = locker
//!     .acquire("deploy", AcquireOptions::new().wait_handler(ProgressWait::default()))
//!     .await?;
//! let keeper = locker.hold_lease(handle.clone(), HoldOptions::new(Duration::from_secs(10)))?;
//!
//! // ... work while the lease is renewed ...
//!
//! keeper.stop().await;
//! locker.release(&handle).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`LockBackend`]: leasegate_core::LockBackend

mod error;
mod keeper;
mod locker;
mod options;
mod wait;

pub use error::LockerError;
pub use keeper::{HoldOutcome, LeaseKeeper};
pub use locker::DistributedLocker;
pub use options::{AcquireOptions, DEFAULT_POLL_INTERVAL, DEFAULT_TTL, HoldOptions};
pub use wait::{DirectWait, ProgressWait, WaitFuture, WaitHandler};

pub use tokio_util::sync::CancellationToken;
