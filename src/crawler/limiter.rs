//! Fetch admission and request pacing
//!
//! Two politeness mechanisms live here:
//!
//! - a semaphore capping how many fetch operations are in flight at once;
//!   [`FetchLimiter::admit`] suspends the caller until a slot frees, and the
//!   returned permit releases its slot on drop, whatever path the holder
//!   takes out of scope
//! - a randomized inter-request delay drawn uniformly from
//!   `[min_delay, min_delay + jitter]`, applied between sequential top-level
//!   entity fetches to avoid a predictable request cadence

use crate::config::CrawlerConfig;
use crate::{GrimoireError, Result};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps concurrent fetches and paces sequential ones
#[derive(Debug)]
pub struct FetchLimiter {
    semaphore: Arc<Semaphore>,
    min_delay: Duration,
    jitter: Duration,
}

impl FetchLimiter {
    pub fn new(max_concurrent: u32, min_delay: Duration, jitter: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1) as usize)),
            min_delay,
            jitter,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_concurrent_fetches,
            config.min_request_delay(),
            config.request_jitter(),
        )
    }

    /// Waits for a fetch slot; FIFO admission order
    ///
    /// The slot is held for the lifetime of the returned permit.
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GrimoireError::Setup("fetch limiter semaphore closed".to_string()))
    }

    /// Randomized delay to insert between sequential entity fetches
    pub fn inter_request_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.min_delay;
        }
        let jitter_ms = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
        self.min_delay + Duration::from_millis(jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_delay_within_configured_range() {
        let limiter = FetchLimiter::new(1, Duration::from_secs(3), Duration::from_secs(4));

        for _ in 0..200 {
            let delay = limiter.inter_request_delay();
            assert!(delay >= Duration::from_secs(3), "delay {:?} too short", delay);
            assert!(delay <= Duration::from_secs(7), "delay {:?} too long", delay);
        }
    }

    #[test]
    fn test_zero_jitter_is_fixed_delay() {
        let limiter = FetchLimiter::new(1, Duration::from_millis(500), Duration::ZERO);
        assert_eq!(limiter.inter_request_delay(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_never_exceeded() {
        let limiter = Arc::new(FetchLimiter::new(3, Duration::ZERO, Duration::ZERO));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let limiter = Arc::clone(&limiter);
            let in_flight = Arc::clone(&in_flight);
            let max_observed = Arc::clone(&max_observed);
            handles.push(tokio::spawn(async move {
                let _permit = limiter.admit().await.unwrap();
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_observed.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(max_observed.load(Ordering::SeqCst) <= 3);
        assert!(max_observed.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let limiter = FetchLimiter::new(1, Duration::ZERO, Duration::ZERO);

        let permit = limiter.admit().await.unwrap();
        drop(permit);

        // Would hang forever if the slot leaked
        let _second = tokio::time::timeout(Duration::from_secs(1), limiter.admit())
            .await
            .expect("slot was not released")
            .unwrap();
    }
}
