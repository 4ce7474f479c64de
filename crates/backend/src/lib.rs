//! The lock authority's state machine.
//!
//! [`OptimisticLockingBackend`] turns a [`LockRecordStore`]'s read and
//! compare-and-swap primitives into the lease operations of the
//! [`LockBackend`] contract. Every mutation goes through CAS, so concurrent
//! acquirers never observe a torn write and no external locking is needed.
//!
//! [`LockRecordStore`]: leasegate_store::LockRecordStore
//! [`LockBackend`]: leasegate_core::LockBackend

mod backend;
mod clock;
mod config;

pub use backend::OptimisticLockingBackend;
pub use clock::{Clock, MonotonicClock};
pub use config::BackendConfig;
