//! Reconnect backoff
//!
//! Exponential delay shared by the stats source and the OBS sink:
//! 2s, 4s, 8s, 16s, then capped at 32s.

use std::time::{Duration, Instant};

const BASE_SECS: u64 = 2;
const MAX_SECS: u64 = 32;

/// Consecutive-failure counter with exponential delay
#[derive(Debug, Clone, Default)]
pub struct Backoff {
    failures: u32,
    retry_at: Option<Instant>,
}

impl Backoff {
    /// Create a backoff with no recorded failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay to wait after the n-th consecutive failure (0-based)
    pub fn delay_for(attempt: u32) -> Duration {
        let secs = BASE_SECS.saturating_mul(1u64 << attempt.min(16));
        Duration::from_secs(secs.min(MAX_SECS))
    }

    /// Record a failure at `now` and return how long to wait
    pub fn fail(&mut self, now: Instant) -> Duration {
        let delay = Self::delay_for(self.failures);
        self.failures = self.failures.saturating_add(1);
        self.retry_at = Some(now + delay);
        delay
    }

    /// Clear the failure count after a success
    pub fn reset(&mut self) {
        self.failures = 0;
        self.retry_at = None;
    }

    /// Number of consecutive failures recorded
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Current delay if failing, `None` when healthy
    pub fn current_delay(&self) -> Option<Duration> {
        self.failures
            .checked_sub(1)
            .map(Self::delay_for)
    }

    /// Time left before another attempt is allowed
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.retry_at
            .and_then(|at| at.checked_duration_since(now))
            .filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_sequence() {
        let delays: Vec<u64> = (0..7).map(|n| Backoff::delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32, 32, 32]);
    }

    #[test]
    fn test_huge_attempt_is_capped() {
        assert_eq!(Backoff::delay_for(u32::MAX), Duration::from_secs(32));
    }

    #[test]
    fn test_fail_and_reset() {
        let now = Instant::now();
        let mut backoff = Backoff::new();
        assert_eq!(backoff.current_delay(), None);

        assert_eq!(backoff.fail(now), Duration::from_secs(2));
        assert_eq!(backoff.fail(now), Duration::from_secs(4));
        assert_eq!(backoff.failures(), 2);
        assert_eq!(backoff.current_delay(), Some(Duration::from_secs(4)));

        backoff.reset();
        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.remaining(now), None);
    }

    #[test]
    fn test_remaining() {
        let now = Instant::now();
        let mut backoff = Backoff::new();
        backoff.fail(now);

        assert_eq!(backoff.remaining(now), Some(Duration::from_secs(2)));
        assert_eq!(
            backoff.remaining(now + Duration::from_secs(1)),
            Some(Duration::from_secs(1))
        );
        assert_eq!(backoff.remaining(now + Duration::from_secs(2)), None);
    }
}
