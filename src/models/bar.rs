use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// One canonical OHLCV bar.
///
/// Invariants (enforced by the schema validator before a series reaches a
/// caller): all numeric fields finite, `high >= low`, and `amount` equals
/// `close * volume` when the provider did not supply it independently.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBar {
    /// Timestamp of the bar, always UTC
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Traded amount (turnover); derived as `close * volume` when absent
    pub amount: f64,
}

/// An ordered series of bars with strictly increasing, unique timestamps.
///
/// This is the only artifact returned to callers; anything that fails
/// validation never becomes a `CanonicalSeries` the caller can see.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSeries {
    bars: Vec<CanonicalBar>,
}

impl CanonicalSeries {
    pub fn new(bars: Vec<CanonicalBar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[CanonicalBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&CanonicalBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&CanonicalBar> {
        self.bars.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalBar> {
        self.bars.iter()
    }

    /// The trailing window of the most recent `n` bars.
    ///
    /// Returns the whole series when it holds fewer than `n` bars. This is
    /// the history handed to the forecasting consumer.
    pub fn lookback(&self, n: usize) -> &[CanonicalBar] {
        let skip = self.bars.len().saturating_sub(n);
        &self.bars[skip..]
    }

    /// Generate `len` future timestamps continuing at the series' native
    /// cadence, starting one step after the last observed bar.
    ///
    /// Empty for an empty series.
    pub fn future_index(&self, interval: Interval, len: usize) -> Vec<DateTime<Utc>> {
        let Some(last) = self.last() else {
            return Vec::new();
        };

        let step = interval.step();
        let mut out = Vec::with_capacity(len);
        let mut cursor = last.timestamp;
        for _ in 0..len {
            cursor += step;
            out.push(cursor);
        }
        out
    }
}

impl<'a> IntoIterator for &'a CanonicalSeries {
    type Item = &'a CanonicalBar;
    type IntoIter = std::slice::Iter<'a, CanonicalBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
