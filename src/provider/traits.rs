//! Market data provider trait definition.
//!
//! Implement [`MarketDataProvider`] to plug a new upstream into the source
//! chain. The core owns no wire protocol: an adapter talks whatever
//! transport it needs and hands back provider-native rows; the normalizer
//! does the rest.

use async_trait::async_trait;
use chrono_tz::Tz;

use crate::errors::ProviderError;
use crate::models::{Interval, RawRow, TimeRange};
use crate::normalize::FieldMap;

use super::profile::FetchProfile;

/// A historical market data source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use market_feed::provider::{FetchProfile, MarketDataProvider};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn field_map(&self) -> FieldMap {
///         FieldMap::yahoo_style()
///     }
///
///     async fn fetch(
///         &self,
///         symbol: &str,
///         range: TimeRange,
///         interval: Interval,
///     ) -> Result<Vec<RawRow>, ProviderError> {
///         // ... call the upstream, translate rows and errors
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier, a constant like "YAHOO" or "EASTMONEY".
    /// Used for logging, events, and error context.
    fn id(&self) -> &'static str;

    /// Ordering within a source chain. Lower is tried first. Default 10.
    fn priority(&self) -> u8 {
        10
    }

    /// The timezone applied to timezone-naive row timestamps.
    ///
    /// This is a declared contract of the source, not something inferred
    /// from the data. Domestic feeds that stamp rows in exchange-local
    /// time must say so here (e.g. `Asia/Shanghai`). Defaults to UTC.
    fn source_timezone(&self) -> Tz {
        Tz::UTC
    }

    /// Fixed mapping from this provider's labels to the canonical schema.
    ///
    /// Must cover open/high/low/close; the normalizer rejects batches
    /// from a provider whose map leaves a required field uncovered.
    fn field_map(&self) -> FieldMap;

    /// Pacing configuration for this provider.
    ///
    /// Fallback providers typically return [`FetchProfile::conservative`].
    fn profile(&self) -> FetchProfile {
        FetchProfile::default()
    }

    /// Fetch raw rows for one sub-range.
    ///
    /// An empty vector is a valid response (no trading sessions in the
    /// range, or the upstream silently returned nothing); the fetcher
    /// treats it as retryable, not as an error.
    async fn fetch(
        &self,
        symbol: &str,
        range: TimeRange,
        interval: Interval,
    ) -> Result<Vec<RawRow>, ProviderError>;
}
