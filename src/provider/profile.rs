//! Per-provider fetch pacing configuration.

use std::time::Duration;

use chrono::Duration as ChronoDuration;

/// Controls how aggressively a provider is called: batch sizing, retry
/// budget, and the various waits that keep us under its rate limits.
#[derive(Clone, Debug)]
pub struct FetchProfile {
    /// Largest sub-range requested in a single call.
    pub max_batch_span: ChronoDuration,

    /// Attempt budget per sub-range.
    pub max_retries: u32,

    /// Base wait for the first rate-limit backoff; doubles per attempt.
    pub base_backoff: Duration,

    /// Upper clamp on any single backoff wait.
    pub backoff_cap: Duration,

    /// Base wait after a transient network failure; escalates linearly.
    pub transient_delay: Duration,

    /// Uniform range for the pause between consecutive batches.
    pub inter_batch_delay: (Duration, Duration),

    /// Mandatory spacing before every provider call, success or not.
    /// Distinct from error backoff: this is what keeps a healthy run from
    /// tripping the limiter in the first place.
    pub min_request_spacing: Duration,
}

impl Default for FetchProfile {
    fn default() -> Self {
        Self {
            max_batch_span: ChronoDuration::days(180),
            max_retries: 3,
            base_backoff: Duration::from_secs(60),
            backoff_cap: Duration::from_secs(600),
            transient_delay: Duration::from_secs(2),
            inter_batch_delay: (Duration::from_secs(5), Duration::from_secs(10)),
            min_request_spacing: Duration::from_secs(2),
        }
    }
}

impl FetchProfile {
    /// A more cautious profile for fallback providers: smaller batches,
    /// more retries, longer pauses between batches.
    pub fn conservative() -> Self {
        Self {
            max_batch_span: ChronoDuration::days(90),
            max_retries: 5,
            inter_batch_delay: (Duration::from_secs(10), Duration::from_secs(15)),
            ..Self::default()
        }
    }
}
