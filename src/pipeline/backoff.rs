//! Exponential backoff schedule, kept free of I/O so it can be tested alone.
//!
//! The wait after attempt `n` (0-indexed) is `base × 2^n`. With the default
//! 1 s base the schedule reads 1 s, 2 s, 4 s, 8 s, 16 s. No wait follows the
//! last attempt: once it is rate-limited the run fails straight away.

use std::time::Duration;

/// Default base delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Delay before the attempt following `attempt`, or `None` if `attempt` was the last.
///
/// Uses the default 1 s base.
pub fn backoff_delay(attempt: u32, max_attempts: u32) -> Option<Duration> {
    RetryPolicy::new(max_attempts, DEFAULT_BASE_DELAY).delay_after(attempt)
}

/// Attempt ceiling plus base delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// `base × 2^attempt` if another attempt is allowed after `attempt` (0-indexed).
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.max_attempts {
            return None;
        }
        let factor = 2u32.checked_pow(attempt)?;
        self.base_delay.checked_mul(factor)
    }

    /// Every wait the policy can produce, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts)
            .map_while(|a| self.delay_after(a))
            .collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, DEFAULT_BASE_DELAY)
    }
}
