//! Market Feed Crate
//!
//! Resilient acquisition and normalization of OHLCV time series from
//! unreliable, rate-limited market data providers.
//!
//! # Overview
//!
//! The feed turns "give me N days of history for this symbol" into a
//! validated canonical series, absorbing everything real providers throw
//! at it along the way:
//! - Long ranges split into provider-sized batches
//! - Rate limits handled with capped exponential backoff and jitter
//! - Failed batches skipped, not fatal; partial coverage is usable
//! - Automatic fallback across a priority-ordered provider chain
//! - Provider-native rows (foreign labels, string sentinels, naive
//!   local timestamps) normalized into one canonical schema
//! - Every result validated before a caller sees it
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   MarketFeed     |  (request facade)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   SourceChain    | --> |   BatchPlan      |  (range splitting)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   BatchFetcher   | --> |  RateLimitPolicy |  (retry + backoff)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |    Normalizer    | --> |  SchemaValidator |  (final gate)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  CanonicalSeries |  (validated OHLCV bars)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketFeed`] - Facade wiring chain, normalizer, and validator
//! - [`MarketDataProvider`] - Trait a provider adapter implements
//! - [`FetchProfile`] - Per-provider pacing and retry parameters
//! - [`CanonicalBar`] / [`CanonicalSeries`] - The validated output
//! - [`TimeRange`] / [`BatchPlan`] - Half-open ranges and their splits
//! - [`FeedEvent`] / [`EventSink`] - Progress observation
//! - [`CancelToken`] - Cooperative cancellation of in-flight requests

pub mod errors;
pub mod feed;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod provider;

pub use errors::{FeedError, ProviderError, RetryClass};

pub use models::{
    BatchPlan, CanonicalBar, CanonicalSeries, Interval, ProviderId, RawBatch, RawRow,
    RawTimestamp, TimeRange,
};

pub use provider::{FetchProfile, MarketDataProvider};

pub use fetch::{
    BatchFetcher, CancelToken, ChainOutput, EventSink, FeedEvent, LogSink, NullSink,
    RateLimitPolicy, SourceChain,
};

pub use normalize::{coerce_numeric, CanonicalField, FieldMap, Normalizer, SchemaValidator};

pub use feed::MarketFeed;
