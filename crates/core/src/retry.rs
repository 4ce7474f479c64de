use std::time::Duration;

/// Delay curve between repeated attempts.
///
/// Used both for polling a held lock and for retrying failed transport
/// calls. Every variant is clamped so a delay never exceeds its maximum.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// `base * multiplier^attempt`, optionally spread by deterministic jitter.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
        /// Upper bound on any computed delay.
        max: Duration,
        /// Growth factor per attempt.
        multiplier: f64,
        /// Stretch each delay by a deterministic 0-40% factor derived from
        /// the attempt number. The factor is the same for every caller, so
        /// it varies the spacing of one caller's retries but does not
        /// desynchronize callers that started together.
        jitter: bool,
    },
    /// `delay * (attempt + 1)`, clamped to `max`.
    Linear { delay: Duration, max: Duration },
    /// The same delay every time.
    Constant { delay: Duration },
}

impl RetryStrategy {
    /// A fixed poll interval.
    #[must_use]
    pub fn constant(delay: Duration) -> Self {
        Self::Constant { delay }
    }

    /// Doubling backoff from `base` up to `max`, with jitter.
    #[must_use]
    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self::Exponential {
            base,
            max,
            multiplier: 2.0,
            jitter: true,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    ///
    /// ```
    /// use std::time::Duration;
    /// use leasegate_core::RetryStrategy;
    ///
    /// let poll = RetryStrategy::constant(Duration::from_secs(1));
    /// assert_eq!(poll.delay_for(0), Duration::from_secs(1));
    /// assert_eq!(poll.delay_for(7), Duration::from_secs(1));
    /// ```
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::Exponential {
                base,
                max,
                multiplier,
                jitter,
            } => {
                // Saturate the exponent; anything past this is clamped anyway.
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX).min(64);
                let mut secs = base.as_secs_f64() * multiplier.powi(exp);
                if *jitter {
                    secs *= 1.0 + 0.1 * f64::from(attempt % 5);
                }
                clamp_secs(secs, *max)
            }
            Self::Linear { delay, max } => {
                let secs = delay.as_secs_f64() * (f64::from(attempt) + 1.0);
                clamp_secs(secs, *max)
            }
            Self::Constant { delay } => *delay,
        }
    }
}

fn clamp_secs(secs: f64, max: Duration) -> Duration {
    if secs.is_finite() && secs < max.as_secs_f64() {
        Duration::from_secs_f64(secs.max(0.0))
    } else {
        max
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}
