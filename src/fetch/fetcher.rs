//! Single-batch fetch loop.
//!
//! Runs one sub-range against one provider: mandatory request spacing
//! before every call, classified waits between retries, and an explicit
//! attempt-outcome variant instead of error-driven control flow.

use crate::errors::{FeedError, ProviderError};
use crate::models::{Interval, RawBatch, RawRow, TimeRange};
use crate::provider::{FetchProfile, MarketDataProvider};

use super::cancel::CancelToken;
use super::events::{EventSink, FeedEvent};
use super::policy::RateLimitPolicy;

/// What one provider call produced, with the retry decision already made.
#[derive(Debug)]
enum AttemptOutcome {
    /// Rows came back; the batch is done.
    Success(Vec<RawRow>),
    /// The call succeeded but returned nothing. Retryable: upstreams
    /// sometimes serve empty payloads under load.
    Empty,
    /// A retryable failure and the computed wait before the next attempt.
    Retry {
        error: ProviderError,
        wait: std::time::Duration,
    },
    /// A rejection that no amount of retrying will fix.
    Fatal(ProviderError),
}

/// Fetches one sub-range from one provider under a pacing profile.
pub struct BatchFetcher<'a> {
    provider: &'a dyn MarketDataProvider,
    profile: &'a FetchProfile,
    policy: RateLimitPolicy,
    events: &'a dyn EventSink,
    cancel: &'a CancelToken,
}

impl<'a> BatchFetcher<'a> {
    pub fn new(
        provider: &'a dyn MarketDataProvider,
        profile: &'a FetchProfile,
        events: &'a dyn EventSink,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            provider,
            profile,
            policy: RateLimitPolicy::from_profile(profile),
            events,
            cancel,
        }
    }

    /// Fetch `range`, retrying per the policy up to the attempt budget.
    ///
    /// Returns:
    /// - `Ok(batch)` with rows on the first successful attempt;
    /// - `Ok(batch)` with no rows when every attempt came back empty;
    ///   the caller decides whether partial plan coverage is acceptable;
    /// - `Err(BatchExhausted)` when the budget ran out on errors;
    /// - `Err(ProviderRejected)` on a fatal rejection;
    /// - `Err(Cancelled)` if the cancellation signal fired mid-wait.
    pub async fn fetch_range(
        &self,
        symbol: &str,
        range: TimeRange,
        interval: Interval,
    ) -> Result<RawBatch, FeedError> {
        let budget = self.profile.max_retries.max(1);

        for attempt in 1..=budget {
            // Pre-emptive spacing, applied even when everything succeeds.
            self.cancel.sleep(self.profile.min_request_spacing).await?;

            let outcome = match self.provider.fetch(symbol, range, interval).await {
                Ok(rows) if rows.is_empty() => AttemptOutcome::Empty,
                Ok(rows) => AttemptOutcome::Success(rows),
                Err(error) => match self.policy.wait_before_retry(&error, attempt) {
                    Some(wait) => AttemptOutcome::Retry { error, wait },
                    None => AttemptOutcome::Fatal(error),
                },
            };

            match outcome {
                AttemptOutcome::Success(rows) => {
                    self.events.emit(&FeedEvent::BatchFetched {
                        provider: self.provider.id().to_string(),
                        range,
                        rows: rows.len(),
                        attempts: attempt,
                    });
                    return Ok(RawBatch {
                        provider: self.provider.id().into(),
                        range,
                        attempts: attempt,
                        rows,
                    });
                }
                AttemptOutcome::Empty => {
                    self.events.emit(&FeedEvent::AttemptEmpty {
                        provider: self.provider.id().to_string(),
                        range,
                        attempt,
                    });
                    if attempt == budget {
                        // Not a failure: report an empty batch and let the
                        // chain decide what zero coverage means.
                        return Ok(RawBatch {
                            provider: self.provider.id().into(),
                            range,
                            attempts: attempt,
                            rows: Vec::new(),
                        });
                    }
                }
                AttemptOutcome::Retry { error, wait } => {
                    let will_retry = attempt < budget;
                    self.events.emit(&FeedEvent::AttemptFailed {
                        provider: self.provider.id().to_string(),
                        range,
                        attempt,
                        error: error.clone(),
                        wait: will_retry.then_some(wait),
                    });
                    if !will_retry {
                        return Err(FeedError::BatchExhausted {
                            range,
                            attempts: budget,
                            last: error,
                        });
                    }
                    self.cancel.sleep(wait).await?;
                }
                AttemptOutcome::Fatal(error) => {
                    self.events.emit(&FeedEvent::AttemptFailed {
                        provider: self.provider.id().to_string(),
                        range,
                        attempt,
                        error: error.clone(),
                        wait: None,
                    });
                    return Err(FeedError::ProviderRejected {
                        provider: self.provider.id().to_string(),
                        symbol: symbol.to_string(),
                        attempts: attempt,
                        source: error,
                    });
                }
            }
        }

        unreachable!("attempt loop always returns within the budget");
    }
}
