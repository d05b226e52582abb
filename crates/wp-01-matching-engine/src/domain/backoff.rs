//! # Bounded Backoff
//!
//! Small retry helper for matches that must absorb the common race where
//! one partial observation is persisted fractionally before its
//! counterpart's store write completes.

use std::time::Duration;

/// Default number of match attempts.
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Default first delay; subsequent delays grow linearly.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(10);

/// Bounded, linearly-increasing retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay before the second attempt; attempt `n` waits `n * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once, for flows that must not wait.
    #[must_use]
    pub fn once() -> Self {
        Self {
            attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// The delay to sleep after a failed attempt (1-based), or `None` when
    /// the attempt was the last.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.attempts {
            None
        } else {
            Some(self.base_delay * (attempt + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_increase_linearly_and_stop_before_last_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(0), Some(Duration::from_millis(10)));
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(20)));
        assert_eq!(policy.delay_after(3), Some(Duration::from_millis(40)));
        assert_eq!(policy.delay_after(4), None, "no sleep after final attempt");
    }

    #[test]
    fn once_never_sleeps() {
        assert_eq!(RetryPolicy::once().delay_after(0), None);
    }
}
