//! Retry decisions and exponential backoff.

use std::time::Duration;

use crate::classify::ErrorKind;

/// Default number of attempts per logical request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(300);

/// Default ceiling for a single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Retry attempts made so far for one logical request.
///
/// `count` only ever increases and never exceeds `max_attempts - 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryAttempt {
    pub count: u32,
}

/// Decides whether a failed attempt is retried, and after how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base: Duration,
    max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl BackoffPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base,
            max_delay,
        }
    }

    /// Total attempts allowed, including the first send.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a failure of `kind` gets another attempt.
    ///
    /// `attempt` counts the retries already made, so the first failure is
    /// checked with `0`.
    pub fn should_retry(&self, kind: ErrorKind, attempt: u32) -> bool {
        let retryable = matches!(kind, ErrorKind::Network | ErrorKind::ServerError(_));
        retryable && attempt + 1 < self.max_attempts
    }

    /// Delay before retry number `attempt`: `base * 2^attempt`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_only_transient_kinds() {
        let policy = BackoffPolicy::default();
        assert!(policy.should_retry(ErrorKind::Network, 0));
        assert!(policy.should_retry(ErrorKind::ServerError(502), 0));
        assert!(!policy.should_retry(ErrorKind::ClientError(400), 0));
        assert!(!policy.should_retry(ErrorKind::AuthExpired, 0));
        assert!(!policy.should_retry(ErrorKind::RefreshFailure, 0));
    }

    #[test]
    fn three_attempts_total() {
        let policy = BackoffPolicy::default();
        let mut attempt = 0;
        let mut sends = 1;
        while policy.should_retry(ErrorKind::Network, attempt) {
            attempt += 1;
            sends += 1;
        }
        assert_eq!(sends, 3);
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = BackoffPolicy::new(
            10,
            Duration::from_millis(100),
            Duration::from_millis(1000),
        );
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(1000));
    }

    #[test]
    fn zero_attempts_clamped() {
        let policy = BackoffPolicy::new(0, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY);
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(ErrorKind::Network, 0));
    }
}
