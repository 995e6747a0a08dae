//! Final-series validation.
//!
//! The last gate before a series reaches a caller. The checks mirror the
//! canonical invariants: non-empty, strictly increasing UTC timestamps,
//! finite numerics, high >= low. The first violation wins; a failing
//! series is never returned.

use crate::errors::FeedError;
use crate::models::{CanonicalBar, CanonicalSeries};

/// Validates a candidate canonical series.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check every canonical invariant, failing on the first violation
    /// with [`FeedError::SchemaViolation`] naming it.
    pub fn validate(&self, series: &CanonicalSeries) -> Result<(), FeedError> {
        if series.is_empty() {
            return Err(violation("series is empty"));
        }

        let mut prev: Option<&CanonicalBar> = None;
        for (index, bar) in series.iter().enumerate() {
            if let Some(prev) = prev {
                if bar.timestamp <= prev.timestamp {
                    return Err(violation(format!(
                        "timestamps not strictly increasing at row {} ({} after {})",
                        index, bar.timestamp, prev.timestamp
                    )));
                }
            }

            for (name, value) in [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
                ("amount", bar.amount),
            ] {
                if !value.is_finite() {
                    return Err(violation(format!(
                        "non-finite {} at row {} ({})",
                        name, index, bar.timestamp
                    )));
                }
            }

            if bar.high < bar.low {
                return Err(violation(format!(
                    "high {} below low {} at row {} ({})",
                    bar.high, bar.low, index, bar.timestamp
                )));
            }

            prev = Some(bar);
        }

        Ok(())
    }
}

fn violation(invariant: impl Into<String>) -> FeedError {
    FeedError::SchemaViolation {
        invariant: invariant.into(),
    }
}
