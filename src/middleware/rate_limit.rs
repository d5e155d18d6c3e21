//! Rate limiting middleware
//!
//! Login attempts are throttled per username so a single account cannot be
//! brute-forced, whatever address the attempts come from.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::utils::errors::{PollError, Result};

/// Keyed GCRA limiter for login attempts
#[derive(Clone)]
pub struct LoginRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl LoginRateLimiter {
    pub fn new(attempts_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(attempts_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
        }
    }

    /// Consume one attempt for `username`
    pub fn check(&self, username: &str) -> Result<()> {
        let key = username.to_lowercase();

        if self.limiter.check_key(&key).is_err() {
            warn!(username = %key, "Login attempts throttled");
            return Err(PollError::RateLimitExceeded);
        }

        // Keep the keyed state from growing without bound
        self.limiter.retain_recent();
        Ok(())
    }
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}
