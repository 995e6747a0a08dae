//! Structured progress events.
//!
//! The pipeline emits events as it works (batch started, attempt failed,
//! fallback engaged) so callers can surface progress however they like.
//! Correctness never depends on anyone observing these; the default sink
//! just forwards to the `log` crate.

use std::time::Duration;

use log::{debug, info, warn};

use crate::errors::ProviderError;
use crate::models::TimeRange;

/// A progress event emitted during a feed request.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    /// A batch plan was built for a provider.
    PlanBuilt {
        provider: String,
        symbol: String,
        batches: usize,
    },
    /// Fetching of one sub-range began.
    BatchStarted {
        provider: String,
        range: TimeRange,
        /// 1-based position in the plan.
        index: usize,
        total: usize,
    },
    /// One attempt failed; `wait` is the computed pause before the next
    /// attempt, absent when the attempt budget is spent or the error is
    /// not retryable.
    AttemptFailed {
        provider: String,
        range: TimeRange,
        attempt: u32,
        error: ProviderError,
        wait: Option<Duration>,
    },
    /// An attempt returned no rows; retried like a failure but without an
    /// upstream error to report.
    AttemptEmpty {
        provider: String,
        range: TimeRange,
        attempt: u32,
    },
    /// A sub-range was fetched.
    BatchFetched {
        provider: String,
        range: TimeRange,
        rows: usize,
        attempts: u32,
    },
    /// A sub-range used up its attempt budget and was skipped.
    BatchSkipped {
        provider: String,
        range: TimeRange,
        attempts: u32,
    },
    /// The whole plan yielded nothing; the chain moved to a fallback.
    FallbackEngaged { from: String, to: String },
    /// The merged, validated series is ready.
    SeriesReady { symbol: String, rows: usize },
}

/// Observer for [`FeedEvent`]s. Implementations must be cheap and must
/// not block; they are called from the fetch path.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &FeedEvent);
}

/// Default sink: forwards events to the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &FeedEvent) {
        match event {
            FeedEvent::PlanBuilt {
                provider,
                symbol,
                batches,
            } => {
                debug!("'{}': plan for {} has {} batch(es)", provider, symbol, batches);
            }
            FeedEvent::BatchStarted {
                provider,
                range,
                index,
                total,
            } => {
                info!("'{}': fetching batch {}/{} {}", provider, index, total, range);
            }
            FeedEvent::AttemptFailed {
                provider,
                range,
                attempt,
                error,
                wait,
            } => match wait {
                Some(wait) => warn!(
                    "'{}': attempt {} for {} failed ({}), retrying in {:?}",
                    provider, attempt, range, error, wait
                ),
                None => warn!(
                    "'{}': attempt {} for {} failed ({}), giving up",
                    provider, attempt, range, error
                ),
            },
            FeedEvent::AttemptEmpty {
                provider,
                range,
                attempt,
            } => {
                debug!("'{}': attempt {} for {} returned no rows", provider, attempt, range);
            }
            FeedEvent::BatchFetched {
                provider,
                range,
                rows,
                attempts,
            } => {
                info!(
                    "'{}': fetched {} row(s) for {} in {} attempt(s)",
                    provider, rows, range, attempts
                );
            }
            FeedEvent::BatchSkipped {
                provider,
                range,
                attempts,
            } => {
                warn!(
                    "'{}': skipping batch {} after {} attempt(s)",
                    provider, range, attempts
                );
            }
            FeedEvent::FallbackEngaged { from, to } => {
                warn!("'{}' yielded no data, falling back to '{}'", from, to);
            }
            FeedEvent::SeriesReady { symbol, rows } => {
                info!("series for {} ready with {} row(s)", symbol, rows);
            }
        }
    }
}

/// Sink that discards everything. Useful in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &FeedEvent) {}
}

/// Sink that records every event, for assertions in tests.
#[cfg(test)]
pub(crate) struct RecordingSink {
    pub events: std::sync::Mutex<Vec<FeedEvent>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl EventSink for RecordingSink {
    fn emit(&self, event: &FeedEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
