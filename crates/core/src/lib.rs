pub mod backend;
pub mod error;
pub mod outcome;
pub mod record;
pub mod retry;
pub mod types;
pub mod wire;

pub use backend::LockBackend;
pub use error::BackendError;
pub use outcome::{AcquireOutcome, ReleaseOutcome, RenewOutcome};
pub use record::{LockHandle, LockRecord, RecordSnapshot, Version};
pub use retry::RetryStrategy;
pub use types::{AcquirerId, LeaseId, LockName, MAX_LOCK_NAME_LEN};
pub use wire::{
    AcquireRequest, AcquireResponse, ReleaseRequest, ReleaseResponse, RenewRequest, RenewResponse,
    duration_to_millis,
};
