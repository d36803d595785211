//! Retry executor for transient fetch failures
//!
//! Wraps any fallible async operation with a bounded number of attempts and
//! a fixed backoff between them. The sleep is a plain awaited tokio sleep:
//! it suspends only the wrapped operation, and dropping the future cancels
//! the backoff along with it.

use crate::config::CrawlerConfig;
use crate::{GrimoireError, Result};
use std::future::Future;
use std::time::Duration;

/// How many times to try and how long to wait between tries
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total invocations allowed, first try included
    pub max_attempts: u32,

    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

/// Runs `op` until it succeeds or the policy's attempts are exhausted
///
/// All wrapped operations are assumed idempotent (page loads, downloads).
/// On exhaustion the last error is surfaced unchanged inside
/// [`GrimoireError::Transient`]; nothing is swallowed. One structured log
/// line is emitted per failed attempt that will be retried.
pub async fn execute_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_attempts {
                    return Err(GrimoireError::Transient {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                let remaining = policy.max_attempts - attempt;
                tracing::warn!(
                    "{} failed (attempt {}/{}, {} retries left), retrying in {:?}: {}",
                    what,
                    attempt,
                    policy.max_attempts,
                    remaining,
                    policy.delay,
                    e
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn failing_error() -> GrimoireError {
        GrimoireError::BadStatus {
            url: "https://example.com/card/x".to_string(),
            status: 503,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result = execute_with_retry(&policy, "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_n_failures_sleeps_n_times() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let start = Instant::now();

        let result = execute_with_retry(&policy, "op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(failing_error())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        // Failed twice, succeeded on the third invocation
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Exactly two backoff sleeps elapsed (paused clock advances precisely)
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(100));

        let result: Result<()> = execute_with_retry(&policy, "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(failing_error()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result.unwrap_err() {
            GrimoireError::Transient { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(
                    *source,
                    GrimoireError::BadStatus { status: 503, .. }
                ));
            }
            other => panic!("expected Transient, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy::new(1, Duration::from_secs(60));
        let start = Instant::now();

        let result: Result<()> =
            execute_with_retry(&policy, "op", || async { Err(failing_error()) }).await;

        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_root_cause_unwraps_transient() {
        let err = GrimoireError::Transient {
            attempts: 3,
            source: Box::new(failing_error()),
        };
        assert!(matches!(
            err.root_cause(),
            GrimoireError::BadStatus { status: 503, .. }
        ));
    }
}
