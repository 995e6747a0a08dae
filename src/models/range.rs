//! Time ranges and batch plans.
//!
//! A requested span is partitioned into provider-safe sub-ranges before
//! fetching: large single requests are what trip provider rate limits in
//! the first place.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::FeedError;

/// An immutable half-open interval `[start, end)` in UTC.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range. Fails with [`FeedError::InvalidRange`] unless
    /// `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, FeedError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(FeedError::InvalidRange { start, end })
        }
    }

    /// The last `days` ending now.
    pub fn last_days(days: i64) -> Result<Self, FeedError> {
        let end = Utc::now();
        Self::new(end - Duration::days(days), end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} .. {})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// An ordered sequence of sub-ranges that exactly covers a requested range.
///
/// Every element spans at most `max_span`; consecutive elements share a
/// boundary (half-open, so no overlap); the last element is the only one
/// allowed to be shorter.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchPlan {
    ranges: Vec<TimeRange>,
}

impl BatchPlan {
    /// Partition `range` into sub-ranges of at most `max_span`.
    ///
    /// A span that already fits produces a single-element plan.
    pub fn split(range: TimeRange, max_span: Duration) -> Self {
        debug_assert!(max_span > Duration::zero());

        if range.span() <= max_span {
            return Self {
                ranges: vec![range],
            };
        }

        let mut ranges = Vec::new();
        let mut cursor = range.start();
        while cursor < range.end() {
            let batch_end = (cursor + max_span).min(range.end());
            // cursor < batch_end always holds here, constructor cannot fail
            ranges.push(TimeRange {
                start: cursor,
                end: batch_end,
            });
            cursor = batch_end;
        }

        Self { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeRange> {
        self.ranges.iter()
    }
}

impl<'a> IntoIterator for &'a BatchPlan {
    type Item = &'a TimeRange;
    type IntoIter = std::slice::Iter<'a, TimeRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = TimeRange::new(utc(2024, 6, 1), utc(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, FeedError::InvalidRange { .. }));

        let err = TimeRange::new(utc(2024, 6, 1), utc(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, FeedError::InvalidRange { .. }));
    }

    #[test]
    fn test_small_span_single_batch() {
        let range = TimeRange::new(utc(2024, 1, 1), utc(2024, 3, 1)).unwrap();
        let plan = BatchPlan::split(range, Duration::days(180));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.ranges()[0], range);
    }

    #[test]
    fn test_split_exact_partition() {
        // 1000 days at 180-day batches -> 6 batches, last one shorter.
        let range = TimeRange::new(utc(2021, 1, 1), utc(2023, 9, 28)).unwrap();
        assert_eq!(range.span(), Duration::days(1000));

        let plan = BatchPlan::split(range, Duration::days(180));
        assert_eq!(plan.len(), 6);

        // Exact cover: first batch starts at range start, last ends at
        // range end, and consecutive batches share a boundary.
        assert_eq!(plan.ranges()[0].start(), range.start());
        assert_eq!(plan.ranges()[5].end(), range.end());
        for pair in plan.ranges().windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }

        // Every batch within budget, only the last is shorter.
        for batch in plan.ranges().iter().take(5) {
            assert_eq!(batch.span(), Duration::days(180));
        }
        assert_eq!(plan.ranges()[5].span(), Duration::days(100));
    }

    #[test]
    fn test_split_exact_multiple() {
        let range = TimeRange::new(utc(2024, 1, 1), utc(2024, 1, 31)).unwrap();
        let plan = BatchPlan::split(range, Duration::days(10));
        assert_eq!(plan.len(), 3);
        for batch in plan.ranges() {
            assert_eq!(batch.span(), Duration::days(10));
        }
    }

    #[test]
    fn test_contains_half_open() {
        let range = TimeRange::new(utc(2024, 1, 1), utc(2024, 2, 1)).unwrap();
        assert!(range.contains(utc(2024, 1, 1)));
        assert!(range.contains(utc(2024, 1, 31)));
        assert!(!range.contains(utc(2024, 2, 1)));
    }
}
