//! Bounded retry with a fixed delay and a per-attempt timeout.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum RetryError<E: Display> {
    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Failed(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first one fails.
    pub max_retries: u32,
    pub delay: Duration,
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_secs(1),
            attempt_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
            attempt_timeout: None,
        }
    }

    /// Runs `op` until it succeeds or `1 + max_retries` attempts have
    /// failed, returning the last error.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, op: F) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_if(operation, op, |_| true).await
    }

    /// Like [`Self::run`], but an error for which `retryable` returns false
    /// is returned at once. Timeouts are always retried.
    pub async fn run_if<T, E, F, Fut, P>(
        &self,
        operation: &str,
        mut op: F,
        retryable: P,
    ) -> Result<T, RetryError<E>>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.max_retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            let outcome = match self.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, op()).await {
                    Ok(result) => result.map_err(RetryError::Failed),
                    Err(_) => Err(RetryError::Timeout(limit)),
                },
                None => op().await.map_err(RetryError::Failed),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(RetryError::Failed(err)) if !retryable(&err) => {
                    return Err(RetryError::Failed(err));
                }
                Err(err) if attempt < attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = attempts,
                        error = %err,
                        "Attempt failed, retrying"
                    );
                    metrics::counter!("retry_attempts_total", "operation" => operation.to_string())
                        .increment(1);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_secs(1),
            attempt_timeout: Some(Duration::from_secs(5)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = policy(2)
            .run("test", || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("unavailable")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = policy(2)
            .run("test", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("down") }
            })
            .await;

        assert!(matches!(result, Err(RetryError::Failed("down"))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = policy(2)
            .run_if(
                "test",
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("malformed row") }
                },
                |e: &&str| !e.starts_with("malformed"),
            )
            .await;

        assert!(matches!(result, Err(RetryError::Failed("malformed row"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempt_times_out() {
        let policy = RetryPolicy {
            max_retries: 0,
            delay: Duration::ZERO,
            attempt_timeout: Some(Duration::from_millis(100)),
        };

        let result: Result<(), RetryError<&str>> = policy
            .run("test", || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(RetryError::Timeout(_))));
    }

    #[tokio::test]
    async fn no_retry_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::no_retry()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope") }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
