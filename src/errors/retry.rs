/// Classification for retry policy.
///
/// Used to determine how the batch fetcher should respond to errors from
/// providers.
///
/// # Behavior Summary
///
/// | Class | Retry Same Batch? | Wait |
/// |-------|-------------------|------|
/// | `Backoff` | Yes, up to the attempt budget | Exponential with jitter, clamped |
/// | `ShortDelay` | Yes, up to the attempt budget | Small linearly-escalating delay |
/// | `Never` | No | None, the batch fails immediately |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Retry with exponential backoff.
    ///
    /// Used when a provider rate limited the request (HTTP 429 and
    /// friends). Each retry waits `base * 2^(attempt-1)` scaled by a
    /// uniform jitter and clamped to a cap, so a long outage never
    /// produces an unbounded wait.
    Backoff,

    /// Retry after a short delay.
    ///
    /// Used for transient network failures (connection reset, timeout)
    /// where the provider itself is not pushing back. The wait escalates
    /// linearly with the attempt number but stays in the low seconds.
    ShortDelay,

    /// Never retry.
    ///
    /// The provider rejected the request outright (unknown symbol,
    /// unsupported interval). Retrying the same request cannot succeed.
    Never,
}

impl RetryClass {
    /// Whether this class permits another attempt at the same batch.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RetryClass::Never)
    }
}
