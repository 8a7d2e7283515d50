//! Rate Limiting Infrastructure
//!
//! In-memory fixed-window counter keyed by identity. Records live for the
//! life of the process (nothing is persisted) and a periodic sweep evicts
//! the ones whose window has elapsed.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Value reported to denied callers. Fixed, not the real remainder.
    pub retry_after_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
            retry_after_secs: 60,
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Denied { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug)]
struct WindowRecord {
    window_start: Instant,
    count: u32,
}

/// Per-key fixed-window limiter
///
/// `check_and_record` runs under the DashMap shard write lock for the key,
/// so the read-compare-increment is atomic for concurrent callers sharing
/// an identity. Different identities only contend when they hash to the
/// same shard.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    config: RateLimitConfig,
    records: DashMap<String, WindowRecord>,
}

impl FixedWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: DashMap::new(),
        }
    }

    /// Count this request against `key` and decide whether it may proceed
    pub fn check_and_record(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();

        let mut record = self
            .records
            .entry(key.to_owned())
            .or_insert(WindowRecord {
                window_start: now,
                count: 0,
            });

        if now.duration_since(record.window_start) >= self.config.window {
            record.window_start = now;
            record.count = 0;
        }

        if record.count < self.config.max_requests {
            record.count += 1;
            return RateLimitDecision::Allowed {
                remaining: self.config.max_requests - record.count,
            };
        }

        tracing::debug!(
            key = %key,
            count = record.count,
            max = self.config.max_requests,
            "Fixed window exhausted"
        );

        RateLimitDecision::Denied {
            retry_after_secs: self.config.retry_after_secs,
        }
    }

    /// Drop every record whose window has elapsed; returns how many went
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window;
        let mut removed = 0;

        self.records.retain(|_, record| {
            let live = now.duration_since(record.window_start) < window;
            if !live {
                removed += 1;
            }
            live
        });

        removed
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Run `sweep_expired` every `period` until the runtime shuts down
pub fn spawn_sweeper(limiter: Arc<FixedWindowRateLimiter>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let removed = limiter.sweep_expired();
            if removed > 0 {
                tracing::debug!(
                    removed = removed,
                    remaining = limiter.len(),
                    "Swept expired rate limit records"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> FixedWindowRateLimiter {
        FixedWindowRateLimiter::new(RateLimitConfig::default())
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window, Duration::from_secs(60));
        assert_eq!(config.retry_after_secs, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_request_in_window_denied() {
        let limiter = limiter();

        for expected_remaining in (0..5).rev() {
            assert_eq!(
                limiter.check_and_record("user_1"),
                RateLimitDecision::Allowed {
                    remaining: expected_remaining
                }
            );
            tokio::time::advance(Duration::from_secs(10)).await;
        }

        assert_eq!(
            limiter.check_and_record("user_1"),
            RateLimitDecision::Denied {
                retry_after_secs: 60
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_reset_after_elapsed() {
        let limiter = limiter();

        for _ in 0..5 {
            assert!(limiter.check_and_record("user_1").is_allowed());
        }
        assert!(!limiter.check_and_record("user_1").is_allowed());

        tokio::time::advance(Duration::from_secs(60)).await;

        // Counter restarts at 1, leaving 4
        assert_eq!(
            limiter.check_and_record("user_1"),
            RateLimitDecision::Allowed { remaining: 4 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_is_fixed_not_remaining() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.check_and_record("user_1");
        }

        tokio::time::advance(Duration::from_secs(59)).await;

        assert_eq!(
            limiter.check_and_record("user_1"),
            RateLimitDecision::Denied {
                retry_after_secs: 60
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.check_and_record("user_1");
        }
        assert!(!limiter.check_and_record("user_1").is_allowed());
        assert!(limiter.check_and_record("user_2").is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_only_elapsed_windows() {
        let limiter = limiter();
        limiter.check_and_record("old");

        tokio::time::advance(Duration::from_secs(45)).await;
        limiter.check_and_record("fresh");

        tokio::time::advance(Duration::from_secs(15)).await;
        assert_eq!(limiter.sweep_expired(), 1);
        assert_eq!(limiter.len(), 1);

        // A swept key starts over
        assert_eq!(
            limiter.check_and_record("old"),
            RateLimitDecision::Allowed { remaining: 4 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_runs_periodically() {
        let limiter = Arc::new(limiter());
        limiter.check_and_record("user_1");

        let handle = spawn_sweeper(limiter.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(limiter.is_empty());

        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_identity_never_exceeds_max() {
        let limiter = Arc::new(limiter());

        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check_and_record("hot_user").is_allowed() })
            })
            .collect();

        let mut allowed = 0;
        for task in tasks {
            if task.await.unwrap() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 5);
    }
}
