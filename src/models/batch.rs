//! Provider-native rows and per-batch fetch results.
//!
//! Rows arrive exactly as the upstream shaped them: labels in the
//! provider's own vocabulary (possibly not English), cells loosely typed
//! (numbers, formatted strings, sentinels). The normalizer owns turning
//! this into canonical bars; nothing here interprets the data.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::range::TimeRange;
use super::types::ProviderId;

/// A row timestamp as the provider delivered it.
///
/// Timezone-naive stamps are converted using the provider's declared
/// source timezone, never by guessing from the data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawTimestamp {
    /// Already an UTC instant (or carried an offset the adapter resolved).
    Utc(DateTime<Utc>),
    /// Naive local time in the provider's declared source timezone.
    Naive(NaiveDateTime),
}

/// One provider-native row: a timestamp plus labeled, loosely-typed cells.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    pub timestamp: RawTimestamp,
    pub cells: BTreeMap<String, Value>,
}

impl RawRow {
    pub fn new(timestamp: RawTimestamp) -> Self {
        Self {
            timestamp,
            cells: BTreeMap::new(),
        }
    }

    /// Builder-style cell insertion, mostly for adapters and tests.
    pub fn with_cell(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells.insert(label.into(), value.into());
        self
    }

    pub fn cell(&self, label: &str) -> Option<&Value> {
        self.cells.get(label)
    }
}

/// The result of fetching one sub-range from one provider.
///
/// Created by the batch fetcher, consumed (and discarded) by the merger.
/// An empty `rows` is a legitimate outcome: the sub-range may simply hold
/// no trading sessions, and the caller decides whether partial plan
/// coverage is acceptable.
#[derive(Clone, Debug)]
pub struct RawBatch {
    /// Which provider produced these rows.
    pub provider: ProviderId,
    /// The sub-range this batch covers.
    pub range: TimeRange,
    /// How many attempts it took (1 = first try succeeded).
    pub attempts: u32,
    pub rows: Vec<RawRow>,
}

impl RawBatch {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
