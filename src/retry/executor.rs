//! Async retry loop
//!
//! Attempts are strictly sequential: the next attempt starts only after the
//! previous one resolved and its backoff delay elapsed. Dropping the returned
//! future (e.g. from an outer `tokio::time::timeout`) abandons both the
//! in-flight attempt and any pending delay.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::policy::RetryPolicy;

/// Details of a scheduled retry, handed to the `on_retry` observer
#[derive(Debug)]
pub struct RetryAttempt<'a, E> {
    /// The failure that triggered this retry
    pub error: &'a E,
    /// 1-based retry number ("attempt N of M")
    pub attempt: u32,
    pub max_retries: u32,
    /// How long the executor will wait before the next call
    pub delay: Duration,
}

type RetryObserver<E> = Box<dyn Fn(&RetryAttempt<'_, E>) + Send + Sync>;

/// Runs an operation under a [`RetryPolicy`]
///
/// Holds no state between calls, so one executor can drive any number of
/// concurrent `execute` calls.
pub struct RetryExecutor<E> {
    policy: RetryPolicy<E>,
    label: String,
    on_retry: Option<RetryObserver<E>>,
}

impl<E: fmt::Display> RetryExecutor<E> {
    pub fn new(policy: RetryPolicy<E>) -> Self {
        Self {
            policy,
            label: "operation".to_string(),
            on_retry: None,
        }
    }

    /// Name used in log lines
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Register an observer called once per scheduled retry, before the delay
    pub fn on_retry<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RetryAttempt<'_, E>) + Send + Sync + 'static,
    {
        self.on_retry = Some(Box::new(observer));
        self
    }

    pub fn policy(&self) -> &RetryPolicy<E> {
        &self.policy
    }

    /// Call `operation` until it succeeds, fails terminally, or the retry
    /// budget is spent. The last error is returned unchanged.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = %self.label,
                            attempts = attempt + 1,
                            "Succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if attempt >= max_retries {
                if max_retries > 0 {
                    warn!(
                        operation = %self.label,
                        attempts = attempt + 1,
                        error = %error,
                        "Retry budget exhausted"
                    );
                }
                return Err(error);
            }

            if !self.policy.should_retry(&error) {
                debug!(
                    operation = %self.label,
                    attempt = attempt + 1,
                    error = %error,
                    "Failure is not retryable"
                );
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                operation = %self.label,
                attempt = attempt + 1,
                max = max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, retrying"
            );

            if let Some(observer) = &self.on_retry {
                observer(&RetryAttempt {
                    error: &error,
                    attempt: attempt + 1,
                    max_retries,
                    delay,
                });
            }

            drop(error);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// One-shot form of [`RetryExecutor::execute`] without an observer
pub async fn execute<T, E, F, Fut>(operation: F, policy: RetryPolicy<E>) -> Result<T, E>
where
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryExecutor::new(policy).execute(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::error::OperationError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn fast_policy(max_retries: u32) -> RetryPolicy<OperationError> {
        RetryPolicy::new(max_retries, Duration::from_millis(100), Duration::from_secs(1))
            .without_jitter()
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_operation_uses_whole_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OperationError::http(503, "unavailable")) }
            },
            fast_policy(2),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(OperationError::Http { status: 503, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();
        let result: Result<(), _> = execute(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(OperationError::Network("reset".into())) }
            },
            fast_policy(0),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_each_retry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let executor = RetryExecutor::new(fast_policy(3)).on_retry(move |retry| {
            sink.lock()
                .expect("observer lock")
                .push((retry.attempt, retry.max_retries, retry.delay));
        });

        let calls = AtomicU32::new(0);
        let value = executor
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(OperationError::Timeout)
                    } else {
                        Ok("saved")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "saved");
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (1, 3, Duration::from_millis(100)),
                (2, 3, Duration::from_millis(200)),
            ]
        );
    }
}
