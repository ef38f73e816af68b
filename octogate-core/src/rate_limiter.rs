//! Outbound rate limiting for Octogate.
//!
//! Provides a token-bucket admission gate bounding the rate of requests
//! the proxy sends upstream: burst capacity of one slot, refilled every
//! `window_duration / max_requests` (720 ms at the default 5000/hour).
//!
//! # Algorithm
//!
//! The bucket holds a single timestamp: the instant the next slot becomes
//! available. Acquiring checks the timestamp under a lock; if the slot is
//! ready, it is consumed by pushing the timestamp one refill interval into
//! the future. Otherwise the caller sleeps until the advertised instant
//! and re-checks, so a cancelled wait never consumes or reserves a slot.
//!
//! # Thread Safety
//!
//! The bucket state is a plain `std::sync::Mutex`; the critical section
//! never awaits, so holding it cannot block the Tokio thread pool. All
//! sleeping happens outside the lock.
//!
//! # Example
//!
//! ```ignore
//! let limiter = RateLimiter::new(&RateLimitConfig::default());
//!
//! if limiter.acquire().await.is_err() {
//!     // Respond 429 without contacting the upstream
//! }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::OctogateError;
use crate::types::RateLimitConfig;

/// Token-bucket admission gate shared across all request tasks.
///
/// Cloning is cheap and clones share the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
    refill_interval: Duration,
    wait_timeout: Option<Duration>,
}

struct BucketState {
    /// Instant at which the next admission slot becomes available.
    next_slot: Instant,
}

impl RateLimiter {
    /// Creates a limiter for the given quota. The bucket starts full, so
    /// the first admission is immediate.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BucketState {
                next_slot: Instant::now(),
            })),
            refill_interval: config.refill_interval(),
            wait_timeout: None,
        }
    }

    /// Bounds how long [`acquire`](Self::acquire) may block before failing
    /// with [`OctogateError::RateLimitExceeded`].
    ///
    /// Without a timeout, `acquire` waits indefinitely (the wait still
    /// ends if the caller drops the future, e.g. on client disconnect).
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Time between two consecutive admission slots.
    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    /// Blocks the calling task until an admission slot is available.
    ///
    /// Returns [`OctogateError::RateLimitExceeded`] if the configured wait
    /// timeout elapses first. A failed or cancelled acquire leaves no
    /// partial state behind: the slot it was waiting for stays available
    /// for the next caller.
    pub async fn acquire(&self) -> Result<(), OctogateError> {
        match self.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, self.wait_for_slot())
                .await
                .map_err(|_| OctogateError::RateLimitExceeded),
            None => {
                self.wait_for_slot().await;
                Ok(())
            }
        }
    }

    /// Non-blocking probe: takes a slot if one is immediately available.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.lock_state();
        let now = Instant::now();
        if state.next_slot <= now {
            state.next_slot = now + self.refill_interval;
            true
        } else {
            false
        }
    }

    async fn wait_for_slot(&self) {
        loop {
            let target = {
                let mut state = self.lock_state();
                let now = Instant::now();
                if state.next_slot <= now {
                    state.next_slot = now + self.refill_interval;
                    debug!(
                        refill_ms = self.refill_interval.as_millis() as u64,
                        "admission slot taken"
                    );
                    return;
                }
                state.next_slot
            };

            // Several waiters may wake at the same target instant; one
            // wins the slot and the rest loop back to sleep again.
            tokio::time::sleep_until(target).await;
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
