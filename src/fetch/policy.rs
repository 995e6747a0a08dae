//! Wait computation for classified fetch failures.
//!
//! Rate-limit pushback gets exponential backoff with uniform jitter and a
//! hard cap; transient network failures get a short linearly-escalating
//! delay; fatal rejections get no retry at all.

use std::time::Duration;

use rand::Rng;

use crate::errors::{ProviderError, RetryClass};
use crate::provider::FetchProfile;

/// Computes how long to wait before retrying a failed attempt.
#[derive(Clone, Debug)]
pub struct RateLimitPolicy {
    base_backoff: Duration,
    backoff_cap: Duration,
    transient_delay: Duration,
}

impl RateLimitPolicy {
    pub fn from_profile(profile: &FetchProfile) -> Self {
        Self {
            base_backoff: profile.base_backoff,
            backoff_cap: profile.backoff_cap,
            transient_delay: profile.transient_delay,
        }
    }

    /// The wait before attempt `attempt + 1`, or `None` when the error
    /// class forbids retrying.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub fn wait_before_retry(&self, error: &ProviderError, attempt: u32) -> Option<Duration> {
        match error.retry_class() {
            RetryClass::Backoff => Some(self.backoff(attempt)),
            RetryClass::ShortDelay => Some(self.short_delay(attempt)),
            RetryClass::Never => None,
        }
    }

    /// Exponential backoff: `base * 2^(attempt-1)`, scaled by a uniform
    /// jitter in [0.5, 1.5] and clamped to the cap.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter = rand::thread_rng().gen_range(0.5..=1.5);
        self.backoff_with_jitter(attempt, jitter)
    }

    fn backoff_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let raw = self.base_backoff.as_secs_f64() * 2f64.powi(exponent as i32) * jitter;
        Duration::from_secs_f64(raw.min(self.backoff_cap.as_secs_f64()))
    }

    /// Short delay for transient failures: base times the attempt number,
    /// still clamped to the cap.
    pub fn short_delay(&self, attempt: u32) -> Duration {
        let raw = self.transient_delay.as_secs_f64() * f64::from(attempt.max(1));
        Duration::from_secs_f64(raw.min(self.backoff_cap.as_secs_f64()))
    }
}
