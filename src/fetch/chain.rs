//! Provider fallback chain.
//!
//! Runs the primary provider over the whole batch plan; only when an
//! entire plan yields nothing does the chain escalate to the next
//! provider. Individual failed batches are skipped, not escalated: one
//! good batch is enough to proceed with partial data.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::errors::{FeedError, ProviderError};
use crate::models::{BatchPlan, Interval, RawBatch, TimeRange};
use crate::provider::{FetchProfile, MarketDataProvider};

use super::cancel::CancelToken;
use super::events::{EventSink, FeedEvent};
use super::fetcher::BatchFetcher;

/// The winning provider's batches, plus bookkeeping for error context.
pub struct ChainOutput {
    /// The provider whose plan produced data. Its declared timezone and
    /// field map drive normalization of `batches`.
    pub provider: Arc<dyn MarketDataProvider>,
    /// All batches from that provider's plan, empty ones included.
    pub batches: Vec<RawBatch>,
    /// Total provider calls made across the whole chain.
    pub attempts: u32,
}

impl std::fmt::Debug for ChainOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainOutput")
            .field("provider", &self.provider.id())
            .field("batches", &self.batches)
            .field("attempts", &self.attempts)
            .finish()
    }
}

/// Priority-ordered list of interchangeable providers for one symbol
/// category.
pub struct SourceChain {
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl SourceChain {
    /// Build a chain; providers are ordered by their declared priority
    /// (lower first).
    pub fn new(mut providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.providers
    }

    /// Fetch `range` for `symbol`, escalating across providers.
    ///
    /// Returns the first provider output containing at least one
    /// non-empty batch; [`FeedError::NoDataAvailable`] once every
    /// provider is exhausted.
    pub async fn fetch(
        &self,
        symbol: &str,
        range: TimeRange,
        interval: Interval,
        events: &dyn EventSink,
        cancel: &CancelToken,
    ) -> Result<ChainOutput, FeedError> {
        let mut total_attempts: u32 = 0;
        let mut last_error: Option<ProviderError> = None;

        for (position, provider) in self.providers.iter().enumerate() {
            let profile = provider.profile();
            let plan = BatchPlan::split(range, profile.max_batch_span);
            events.emit(&FeedEvent::PlanBuilt {
                provider: provider.id().to_string(),
                symbol: symbol.to_string(),
                batches: plan.len(),
            });

            let batches = self
                .run_plan(
                    provider.as_ref(),
                    &profile,
                    &plan,
                    symbol,
                    interval,
                    events,
                    cancel,
                    &mut total_attempts,
                    &mut last_error,
                )
                .await?;

            if batches.iter().any(|b| !b.is_empty()) {
                return Ok(ChainOutput {
                    provider: Arc::clone(provider),
                    batches,
                    attempts: total_attempts,
                });
            }

            debug!(
                "'{}' produced no usable batches for {}",
                provider.id(),
                symbol
            );
            if let Some(next) = self.providers.get(position + 1) {
                events.emit(&FeedEvent::FallbackEngaged {
                    from: provider.id().to_string(),
                    to: next.id().to_string(),
                });
            }
        }

        Err(FeedError::NoDataAvailable {
            symbol: symbol.to_string(),
            range,
            providers_tried: self.providers.len(),
            attempts: total_attempts,
            last_error,
        })
    }

    /// Run one provider over its plan, sequentially, with the profile's
    /// pause between batches.
    ///
    /// A fatal rejection abandons the provider's remaining batches (the
    /// same rejection would just repeat) and returns whatever was
    /// gathered so far.
    #[allow(clippy::too_many_arguments)]
    async fn run_plan(
        &self,
        provider: &dyn MarketDataProvider,
        profile: &FetchProfile,
        plan: &BatchPlan,
        symbol: &str,
        interval: Interval,
        events: &dyn EventSink,
        cancel: &CancelToken,
        total_attempts: &mut u32,
        last_error: &mut Option<ProviderError>,
    ) -> Result<Vec<RawBatch>, FeedError> {
        let fetcher = BatchFetcher::new(provider, profile, events, cancel);
        let mut batches = Vec::with_capacity(plan.len());

        for (index, sub_range) in plan.iter().enumerate() {
            if index > 0 {
                cancel.sleep(inter_batch_pause(profile)).await?;
            }

            events.emit(&FeedEvent::BatchStarted {
                provider: provider.id().to_string(),
                range: *sub_range,
                index: index + 1,
                total: plan.len(),
            });

            match fetcher.fetch_range(symbol, *sub_range, interval).await {
                Ok(batch) => {
                    *total_attempts += batch.attempts;
                    batches.push(batch);
                }
                Err(FeedError::BatchExhausted {
                    range,
                    attempts,
                    last,
                }) => {
                    *total_attempts += attempts;
                    *last_error = Some(last.clone());
                    events.emit(&FeedEvent::BatchSkipped {
                        provider: provider.id().to_string(),
                        range,
                        attempts,
                    });
                }
                Err(FeedError::ProviderRejected {
                    attempts, source, ..
                }) => {
                    *total_attempts += attempts;
                    *last_error = Some(source);
                    break;
                }
                Err(other) => return Err(other),
            }
        }

        Ok(batches)
    }
}

/// Random pause within the profile's inter-batch window.
fn inter_batch_pause(profile: &FetchProfile) -> Duration {
    let (lo, hi) = profile.inter_batch_delay;
    if hi <= lo {
        return lo;
    }
    let secs = rand::thread_rng().gen_range(lo.as_secs_f64()..=hi.as_secs_f64());
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::fetch::events::{NullSink, RecordingSink};
    use crate::fetch::testing::{fast_profile, rate_limited, sample_rows, ScriptedProvider};

    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn day_range(days: i64) -> TimeRange {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeRange::new(start, start + ChronoDuration::days(days)).unwrap()
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Arc::new(
            ScriptedProvider::new("PRIMARY", vec![Ok(sample_rows(5))]).with_priority(1),
        );
        let fallback = Arc::new(ScriptedProvider::new("FALLBACK", vec![]).with_priority(2));
        let chain = SourceChain::new(vec![primary.clone(), fallback.clone()]);

        let output = chain
            .fetch(
                "GC=F",
                day_range(30),
                Interval::Daily,
                &NullSink,
                &CancelToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(output.provider.id(), "PRIMARY");
        assert_eq!(output.batches.len(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_priority_orders_providers() {
        let low = Arc::new(ScriptedProvider::new("LOW", vec![]).with_priority(20));
        let high = Arc::new(ScriptedProvider::new("HIGH", vec![]).with_priority(5));
        let chain = SourceChain::new(vec![low, high]);

        assert_eq!(chain.providers()[0].id(), "HIGH");
        assert_eq!(chain.providers()[1].id(), "LOW");
    }

    #[tokio::test]
    async fn test_empty_primary_engages_fallback_once() {
        // Primary answers every attempt of its single batch with nothing.
        let primary = Arc::new(
            ScriptedProvider::new("PRIMARY", vec![Ok(vec![]), Ok(vec![]), Ok(vec![])])
                .with_priority(1),
        );
        let fallback = Arc::new(
            ScriptedProvider::new("FALLBACK", vec![Ok(sample_rows(2))]).with_priority(2),
        );
        let sink = RecordingSink::new();
        let chain = SourceChain::new(vec![primary.clone(), fallback.clone()]);

        let output = chain
            .fetch(
                "GC=F",
                day_range(30),
                Interval::Daily,
                &sink,
                &CancelToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(output.provider.id(), "FALLBACK");
        assert_eq!(primary.calls(), 3);

        let events = sink.events.lock().unwrap();
        let fallbacks = events
            .iter()
            .filter(|e| matches!(e, FeedEvent::FallbackEngaged { .. }))
            .count();
        assert_eq!(fallbacks, 1);
    }

    #[tokio::test]
    async fn test_all_providers_empty_is_no_data_available() {
        let primary = Arc::new(ScriptedProvider::new("PRIMARY", vec![]).with_priority(1));
        let fallback = Arc::new(ScriptedProvider::new("FALLBACK", vec![]).with_priority(2));
        let sink = RecordingSink::new();
        let chain = SourceChain::new(vec![primary, fallback]);

        let err = chain
            .fetch(
                "GC=F",
                day_range(30),
                Interval::Daily,
                &sink,
                &CancelToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            FeedError::NoDataAvailable {
                symbol,
                providers_tried,
                ..
            } => {
                assert_eq!(symbol, "GC=F");
                assert_eq!(providers_tried, 2);
            }
            other => panic!("expected NoDataAvailable, got {:?}", other),
        }

        // Fallback engaged exactly once before giving up.
        let events = sink.events.lock().unwrap();
        let fallbacks = events
            .iter()
            .filter(|e| matches!(e, FeedEvent::FallbackEngaged { .. }))
            .count();
        assert_eq!(fallbacks, 1);
    }

    #[tokio::test]
    async fn test_failed_middle_batch_is_skipped_not_fatal() {
        // 400 days at 180-day batches -> 3 batches. Batch 2 exhausts its
        // retries; batches 1 and 3 still come through.
        let primary = Arc::new(
            ScriptedProvider::new(
                "PRIMARY",
                vec![
                    Ok(sample_rows(3)),
                    Err(rate_limited("PRIMARY")),
                    Err(rate_limited("PRIMARY")),
                    Err(rate_limited("PRIMARY")),
                    Ok(crate::fetch::testing::sample_rows_from(10, 2)),
                ],
            )
            .with_priority(1),
        );
        let sink = RecordingSink::new();
        let chain = SourceChain::new(vec![primary.clone()]);

        let output = chain
            .fetch(
                "GC=F",
                day_range(400),
                Interval::Daily,
                &sink,
                &CancelToken::new(),
            )
            .await
            .unwrap();

        let non_empty: Vec<_> = output.batches.iter().filter(|b| !b.is_empty()).collect();
        assert_eq!(non_empty.len(), 2);
        assert_eq!(output.attempts, 5);

        let events = sink.events.lock().unwrap();
        let skipped = events
            .iter()
            .filter(|e| matches!(e, FeedEvent::BatchSkipped { .. }))
            .count();
        assert_eq!(skipped, 1);
    }

    #[tokio::test]
    async fn test_fatal_abandons_remaining_batches() {
        // 3-batch plan; the very first attempt is a hard rejection, so
        // the provider must not be called for batches 2 and 3.
        let primary = Arc::new(
            ScriptedProvider::new(
                "PRIMARY",
                vec![Err(ProviderError::Fatal {
                    provider: "PRIMARY".to_string(),
                    message: "unknown symbol".to_string(),
                })],
            )
            .with_priority(1),
        );
        let fallback = Arc::new(
            ScriptedProvider::new("FALLBACK", vec![Ok(sample_rows(1))])
                .with_priority(2)
                .with_profile(fast_profile(3)),
        );
        let chain = SourceChain::new(vec![primary.clone(), fallback.clone()]);

        let output = chain
            .fetch(
                "NOPE",
                day_range(400),
                Interval::Daily,
                &NullSink,
                &CancelToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(output.provider.id(), "FALLBACK");
    }

    #[tokio::test]
    async fn test_attempts_count_calls_before_a_rejection() {
        // Primary is rate limited once, then rejects outright; the
        // terminal error must account for both calls plus the empty
        // fallback's attempts.
        let primary = Arc::new(
            ScriptedProvider::new(
                "PRIMARY",
                vec![
                    Err(rate_limited("PRIMARY")),
                    Err(ProviderError::Fatal {
                        provider: "PRIMARY".to_string(),
                        message: "unknown symbol".to_string(),
                    }),
                ],
            )
            .with_priority(1),
        );
        let fallback = Arc::new(ScriptedProvider::new("FALLBACK", vec![]).with_priority(2));
        let chain = SourceChain::new(vec![primary.clone(), fallback.clone()]);

        let err = chain
            .fetch(
                "NOPE",
                day_range(30),
                Interval::Daily,
                &NullSink,
                &CancelToken::new(),
            )
            .await
            .unwrap_err();

        match err {
            FeedError::NoDataAvailable { attempts, .. } => {
                assert_eq!(attempts as usize, primary.calls() + fallback.calls());
                assert_eq!(primary.calls(), 2);
            }
            other => panic!("expected NoDataAvailable, got {:?}", other),
        }
    }
}
