use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// Source of "now" for lease expiry arithmetic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time derived from a monotonic reading.
///
/// Reads the UTC clock once at construction and advances it by
/// [`tokio::time::Instant`] elapsed time afterwards, so wall-clock steps on
/// the authority host cannot shorten or extend live leases. Under a paused
/// tokio clock it follows `tokio::time::advance`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    wall: DateTime<Utc>,
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    /// Start the clock at a fixed wall time.
    pub fn anchored_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.origin.elapsed())
            .ok()
            .and_then(|elapsed| self.wall.checked_add_signed(elapsed))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
