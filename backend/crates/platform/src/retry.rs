//! Bounded retry with exponential backoff
//!
//! Each call owns its own attempt counter; nothing is shared between
//! concurrent callers and the backoff sleep only suspends the calling task.

use std::future::Future;
use std::time::Duration;

/// Whether an error is worth another attempt
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every failure
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay slept after failed attempt `attempt` (zero-based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Why `retry_with_backoff` gave up
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// A non-retryable error ended the loop early
    #[error("aborted: {0}")]
    Aborted(E),

    /// Every attempt failed; `last` is the final error
    #[error("failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

/// Run `op` until it succeeds, hits a non-retryable error, or runs out of attempts
///
/// Sleeps `policy.delay_for(n)` between attempt `n` and `n + 1`; never
/// sleeps after the final attempt.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Retryable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                tracing::warn!(
                    attempt = attempt + 1,
                    error = %e,
                    "Non-retryable failure, giving up"
                );
                return Err(RetryError::Aborted(e));
            }
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = max_attempts,
                    error = %e,
                    "Attempt failed"
                );

                if attempt + 1 >= max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: max_attempts,
                        last: e,
                    });
                }

                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Flaky,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Flaky => write!(f, "flaky"),
                TestError::Fatal => write!(f, "fatal"),
            }
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Flaky)
        }
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_twice_then_succeed() {
        let calls = Arc::new(AtomicU32::new(0));
        let started_at = Arc::new(Mutex::new(Vec::new()));
        let origin = Instant::now();

        let result = retry_with_backoff(RetryPolicy::default(), |_| {
            let calls = calls.clone();
            let started_at = started_at.clone();
            async move {
                started_at.lock().unwrap().push(origin.elapsed());
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError::Flaky)
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let started_at = started_at.lock().unwrap();
        let gaps: Vec<Duration> = started_at.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(gaps.len(), 2);
        assert!(gaps[0] >= Duration::from_millis(1000));
        assert!(gaps[1] >= gaps[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_after_one_call() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with_backoff(RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Fatal) }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Aborted(TestError::Fatal))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_carries_last_error_and_no_trailing_sleep() {
        let calls = AtomicU32::new(0);
        let origin = Instant::now();

        let result: Result<(), _> = retry_with_backoff(RetryPolicy::default(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestError::Flaky) }
        })
        .await;

        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, TestError::Flaky);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff, nothing after the third failure
        let elapsed = origin.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed < Duration::from_millis(4000));
    }

    #[test]
    fn test_exhausted_message() {
        let err = RetryError::Exhausted {
            attempts: 3,
            last: TestError::Flaky,
        };
        assert_eq!(err.to_string(), "failed after 3 attempts: flaky");
    }
}
