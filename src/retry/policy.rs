//! Retry policy: attempt budget, backoff curve and retry eligibility

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::Classify;

/// Upper bound for the random jitter added on top of the backoff delay
const JITTER_RATIO: f64 = 0.10;

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Bounded exponential backoff policy
///
/// The delay before retry number `n` (0-indexed) is
/// `min(base_delay * backoff_factor^n, max_delay)` plus up to 10% jitter.
pub struct RetryPolicy<E> {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    pub jitter: bool,
    predicate: Predicate<E>,
}

impl<E: Classify + 'static> RetryPolicy<E> {
    /// Policy with the default predicate: network failures, timeouts,
    /// rate limiting and 5xx responses are retried.
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self::with_predicate_fn(max_retries, base_delay, max_delay, default_predicate::<E>)
    }
}

impl<E: Classify + 'static> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(10))
    }
}

impl<E> RetryPolicy<E> {
    /// Policy with a caller-supplied retry predicate
    pub fn with_predicate_fn<F>(
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
        predicate: F,
    ) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            max_retries,
            base_delay,
            max_delay: max_delay.max(base_delay),
            backoff_factor: 2.0,
            jitter: true,
            predicate: Arc::new(predicate),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = self.max_delay.max(base_delay);
        self
    }

    /// Set the backoff ceiling (never below the base delay)
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay.max(self.base_delay);
        self
    }

    /// Set the growth factor (clamped to at least 1.0)
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = if factor.is_finite() { factor.max(1.0) } else { 1.0 };
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Replace the retry eligibility predicate
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Total number of calls this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }

    /// Delay before retry `attempt` (0-indexed), without jitter
    ///
    /// Never panics: a factor that is not finite or below 1.0 counts as 1.0,
    /// and anything that does not fit a `Duration` is `max_delay`.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let factor = if self.backoff_factor.is_finite() {
            self.backoff_factor.max(1.0)
        } else {
            1.0
        };
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self.base_delay.as_secs_f64() * factor.powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped)
            .unwrap_or(self.max_delay)
            .min(self.max_delay.max(self.base_delay))
    }

    /// Delay before retry `attempt` (0-indexed), including jitter in `[0, 10%)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_for(attempt);
        if !self.jitter {
            return delay;
        }
        let extra = Duration::try_from_secs_f64(delay.as_secs_f64() * JITTER_RATIO * unit_random())
            .unwrap_or_default();
        delay.saturating_add(extra)
    }
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            backoff_factor: self.backoff_factor,
            jitter: self.jitter,
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_factor", &self.backoff_factor)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}

/// Retry iff the error classifies as transient
pub fn default_predicate<E: Classify>(error: &E) -> bool {
    error.failure_kind().is_retryable()
}

/// Uniform value in `[0, 1)`; falls back to 0 (no jitter) if the OS RNG is unavailable
fn unit_random() -> f64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return 0.0;
    }
    // 53 random bits fill the f64 mantissa exactly
    (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::error::OperationError;

    fn policy() -> RetryPolicy<OperationError> {
        RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(1_000))
    }

    #[test]
    fn test_base_delay_grows_and_caps() {
        let policy = policy().without_jitter();
        assert_eq!(policy.base_delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.base_delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.base_delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.base_delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.base_delay_for(4), Duration::from_millis(1_000));
        assert_eq!(policy.base_delay_for(60), Duration::from_millis(1_000));
        assert_eq!(policy.base_delay_for(u32::MAX), Duration::from_millis(1_000));
    }

    #[test]
    fn test_backoff_is_monotonic() {
        let policy = policy().with_backoff_factor(1.7);
        let mut previous = Duration::ZERO;
        for attempt in 0..40 {
            let delay = policy.base_delay_for(attempt);
            assert!(delay >= previous, "attempt {attempt}: {delay:?} < {previous:?}");
            assert!(delay <= policy.max_delay);
            previous = delay;
        }
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = policy();
        for attempt in 0..6 {
            let base = policy.base_delay_for(attempt);
            for _ in 0..50 {
                let delay = policy.delay_for(attempt);
                assert!(delay >= base);
                assert!(delay < base + base.mul_f64(JITTER_RATIO) + Duration::from_nanos(1));
            }
        }
    }

    #[test]
    fn test_max_delay_never_below_base() {
        let policy: RetryPolicy<OperationError> =
            RetryPolicy::new(1, Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
        let policy = policy.with_max_delay(Duration::from_millis(10));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_factor_clamped() {
        let policy = policy().with_backoff_factor(0.5).without_jitter();
        assert_eq!(policy.backoff_factor, 1.0);
        assert_eq!(policy.base_delay_for(3), Duration::from_millis(100));
    }

    #[test]
    fn test_unbounded_ceiling_does_not_overflow() {
        let policy: RetryPolicy<OperationError> =
            RetryPolicy::new(100, Duration::from_secs(1), Duration::MAX);
        assert_eq!(policy.clone().without_jitter().base_delay_for(10), Duration::from_secs(1024));
        assert_eq!(policy.clone().without_jitter().base_delay_for(70), Duration::MAX);
        assert_eq!(policy.delay_for(70), Duration::MAX);
        assert_eq!(policy.base_delay_for(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_invalid_factor_set_on_field_acts_as_one() {
        let mut policy = policy().without_jitter();
        policy.backoff_factor = -3.0;
        assert_eq!(policy.base_delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(3), Duration::from_millis(100));

        policy.backoff_factor = f64::NAN;
        assert_eq!(policy.base_delay_for(5), Duration::from_millis(100));
    }

    #[test]
    fn test_default_predicate() {
        let policy = policy();
        assert!(policy.should_retry(&OperationError::http(503, "unavailable")));
        assert!(policy.should_retry(&OperationError::http(429, "slow down")));
        assert!(policy.should_retry(&OperationError::Timeout));
        assert!(policy.should_retry(&OperationError::Network("reset".into())));
        assert!(!policy.should_retry(&OperationError::http(400, "bad request")));
        assert!(!policy.should_retry(&OperationError::Validation("title".into())));
    }

    #[test]
    fn test_custom_predicate() {
        let policy = policy().with_predicate(|_| false);
        assert!(!policy.should_retry(&OperationError::http(503, "unavailable")));
    }
}
