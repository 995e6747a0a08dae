//! Error types and retry classification for the feed pipeline.
//!
//! Two layers of errors exist:
//! - [`ProviderError`]: what a single provider call can raise. Each variant
//!   is classified into a [`RetryClass`] that drives the fetch loop.
//! - [`FeedError`]: what a feed request can surface to the caller, including
//!   terminal conditions after retries and fallbacks are spent.

mod retry;

pub use retry::RetryClass;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::TimeRange;

/// Errors raised by a single provider fetch call.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The provider rate limited the request.
    /// Retry with exponential backoff.
    #[error("rate limited by {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// A transient network failure (timeout, connection reset).
    /// Retry after a short delay.
    #[error("transient network failure from {provider}: {message}")]
    TransientNetwork {
        /// The provider that failed
        provider: String,
        /// The underlying failure message
        message: String,
    },

    /// The provider rejected the request outright (unknown symbol,
    /// unsupported interval). Retrying cannot succeed.
    #[error("{provider} rejected the request: {message}")]
    Fatal {
        /// The provider that rejected the request
        provider: String,
        /// The rejection message from the provider
        message: String,
    },
}

impl ProviderError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use market_feed::errors::{ProviderError, RetryClass};
    ///
    /// let error = ProviderError::RateLimited { provider: "YAHOO".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Backoff);
    ///
    /// let error = ProviderError::Fatal {
    ///     provider: "YAHOO".to_string(),
    ///     message: "unknown symbol".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } => RetryClass::Backoff,
            Self::TransientNetwork { .. } => RetryClass::ShortDelay,
            Self::Fatal { .. } => RetryClass::Never,
        }
    }

    /// The provider that produced this error.
    pub fn provider(&self) -> &str {
        match self {
            Self::RateLimited { provider }
            | Self::TransientNetwork { provider, .. }
            | Self::Fatal { provider, .. } => provider,
        }
    }
}

/// Errors surfaced by a feed request.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The requested range is empty or inverted. Not retried.
    #[error("invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A provider's field map does not cover a required canonical field.
    /// The provider's batches are rejected rather than defaulted.
    #[error("provider {provider} does not map required field '{field}'")]
    MissingRequiredField {
        provider: String,
        field: &'static str,
    },

    /// One sub-range used up its whole attempt budget.
    ///
    /// Not request-fatal: the source chain skips the batch and proceeds
    /// with whatever the rest of the plan yields.
    #[error("batch {range} exhausted after {attempts} attempts")]
    BatchExhausted {
        range: TimeRange,
        attempts: u32,
        #[source]
        last: ProviderError,
    },

    /// A provider rejected the request outright mid-plan.
    ///
    /// The chain abandons this provider's remaining batches and escalates
    /// to the next provider.
    #[error("provider {provider} rejected {symbol} after {attempts} attempt(s)")]
    ProviderRejected {
        provider: String,
        symbol: String,
        /// Calls made on this batch before the rejection, the rejecting
        /// one included. Earlier attempts may have failed retryably.
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    /// Every provider in the chain produced zero usable batches. Terminal.
    #[error("no data available for {symbol} over {range} after trying {providers_tried} provider(s)")]
    NoDataAvailable {
        symbol: String,
        range: TimeRange,
        /// How many providers were tried before giving up.
        providers_tried: usize,
        /// Total fetch attempts made across the chain.
        attempts: u32,
        /// The last upstream error observed, if any.
        last_error: Option<ProviderError>,
    },

    /// The merged series broke a canonical invariant. Terminal; a series
    /// failing validation is never returned to the caller.
    #[error("schema violation: {invariant}")]
    SchemaViolation { invariant: String },

    /// The caller's cancellation signal fired during a wait.
    #[error("request cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_uses_backoff() {
        let error = ProviderError::RateLimited {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Backoff);
        assert!(error.retry_class().is_retryable());
    }

    #[test]
    fn test_transient_network_uses_short_delay() {
        let error = ProviderError::TransientNetwork {
            provider: "YAHOO".to_string(),
            message: "connection reset".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::ShortDelay);
        assert!(error.retry_class().is_retryable());
    }

    #[test]
    fn test_fatal_never_retries() {
        let error = ProviderError::Fatal {
            provider: "EASTMONEY".to_string(),
            message: "unknown symbol".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(!error.retry_class().is_retryable());
    }

    #[test]
    fn test_error_display() {
        let error = ProviderError::RateLimited {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(format!("{}", error), "rate limited by YAHOO");

        let error = ProviderError::Fatal {
            provider: "YAHOO".to_string(),
            message: "unknown symbol GC=X".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "YAHOO rejected the request: unknown symbol GC=X"
        );
    }

    #[test]
    fn test_provider_accessor() {
        let error = ProviderError::TransientNetwork {
            provider: "EASTMONEY".to_string(),
            message: "timeout".to_string(),
        };
        assert_eq!(error.provider(), "EASTMONEY");
    }
}
