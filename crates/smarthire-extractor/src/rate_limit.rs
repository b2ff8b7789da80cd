//! Request throttling for model calls
//!
//! Wraps a governor limiter so every model request, including retries and
//! repair prompts, waits for a permit. Clones share the same budget.

use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared request budget for one model endpoint
#[derive(Clone)]
pub struct ModelRateLimiter {
    limiter: Arc<DefaultRateLimiter>,
}

impl ModelRateLimiter {
    /// Limit to `requests_per_minute`, with a burst of the same size.
    /// Returns `None` for 0, which means unthrottled.
    pub fn per_minute(requests_per_minute: u32) -> Option<Self> {
        NonZeroU32::new(requests_per_minute).map(|n| Self::with_quota(Quota::per_minute(n)))
    }

    /// Create with a custom quota
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Take a permit if one is available right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait until a permit is available and take it
    pub async fn acquire(&self) {
        if self.try_acquire() {
            return;
        }
        debug!("Model request budget exhausted, waiting for a permit");
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for ModelRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRateLimiter").finish_non_exhaustive()
    }
}
