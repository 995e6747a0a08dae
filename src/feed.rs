//! Top-level feed facade: plan, fetch with fallback, normalize, validate.

use std::sync::Arc;

use crate::errors::FeedError;
use crate::fetch::{CancelToken, EventSink, FeedEvent, LogSink, SourceChain};
use crate::models::{CanonicalSeries, Interval, TimeRange};
use crate::normalize::{Normalizer, SchemaValidator};
use crate::provider::MarketDataProvider;

/// Acquires canonical OHLCV series from a chain of providers.
///
/// One instance serves many requests; requests are independent and hold
/// no shared mutable state, so concurrent requests for different symbols
/// are fine. Within a request everything runs sequentially: providers
/// enforce shared quotas, so parallel batch fetches would only add
/// coordination cost.
pub struct MarketFeed {
    chain: SourceChain,
    validator: SchemaValidator,
    events: Arc<dyn EventSink>,
}

impl MarketFeed {
    /// Build a feed over the given providers, ordered by their priority.
    /// Events go to the `log` crate by default.
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self {
            chain: SourceChain::new(providers),
            validator: SchemaValidator::new(),
            events: Arc::new(LogSink),
        }
    }

    /// Replace the event sink.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Fetch and normalize `range` for `symbol`.
    ///
    /// `max_rows` caps the result to the most recent rows when the merged
    /// data exceeds the requested window. The returned series has passed
    /// every canonical invariant; on any terminal failure the error
    /// carries symbol, range, and attempt context.
    pub async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        range: TimeRange,
        max_rows: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<CanonicalSeries, FeedError> {
        let output = self
            .chain
            .fetch(symbol, range, interval, self.events.as_ref(), cancel)
            .await?;

        let normalizer = Normalizer::for_provider(output.provider.as_ref());
        let series = normalizer.normalize(&output.batches, max_rows)?;
        self.validator.validate(&series)?;

        self.events.emit(&FeedEvent::SeriesReady {
            symbol: symbol.to_string(),
            rows: series.len(),
        });
        Ok(series)
    }

    /// Fetch the most recent `days` of data, capped to `days` rows.
    /// This is the usual entry point for feeding a forecaster's
    /// lookback window.
    pub async fn fetch_recent(
        &self,
        symbol: &str,
        interval: Interval,
        days: i64,
        cancel: &CancelToken,
    ) -> Result<CanonicalSeries, FeedError> {
        let range = TimeRange::last_days(days)?;
        self.fetch_series(symbol, interval, range, Some(days as usize), cancel)
            .await
    }
}
